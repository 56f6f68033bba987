use chrono::{NaiveDate, NaiveTime};
use serde::Serialize;
use tracing::{debug, info};

use crate::board::{self, BoardCard};
use crate::config::TrackerConfig;
use crate::error::{SnapshotError, ValidationError};
use crate::io::{ImportedTasks, SnapshotSource};
use crate::model::{
    BigProjectDraft, BigProjectId, BigProjectStatus, Burndown, BurndownTarget, Priority,
    ProjectDraft, ProjectId, Schedule, SubProjectDraft, SubProjectId, SubProjectTaskId, TaskDraft,
    TaskId, TaskKey, TaskStatus, Timeline,
};
use crate::progress::{recompute_all, recompute_big_project_progress, recompute_project_progress};
use crate::search::{self, SearchFilters, SearchResult};
use crate::session::SessionContext;
use crate::store::{EntityStore, Snapshot};

/// Which aggregate a mutation touched, so only its progress is recomputed.
#[derive(Debug, Clone, Copy)]
enum Touched {
    Project(ProjectId),
    BigProject(BigProjectId),
    Nothing,
}

/// Outcome of creating imported CSV rows inside a project.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub created: usize,
    /// Rows skipped by the parser plus rows rejected by validation.
    pub skipped: usize,
}

/// Stateful tracker: the entity store plus every derived view.
///
/// Each mutation is one unit: change the store, recompute the affected
/// progress, rebuild the timeline, then refresh the selected burndown.
/// Callers never observe a store that disagrees with its projections.
pub struct Tracker {
    store: EntityStore,
    timeline: Timeline,
    burndown: Burndown,
    burndown_target: Option<BurndownTarget>,
    config: TrackerConfig,
    session: Option<SessionContext>,
}

impl Tracker {
    pub fn new(config: TrackerConfig) -> Self {
        Self::with_store(EntityStore::new(), config)
    }

    /// Rebuild from persisted entities. Stored progress values are discarded
    /// and recomputed.
    pub fn from_snapshot(snapshot: Snapshot, config: TrackerConfig) -> Self {
        let mut store = EntityStore::from_snapshot(snapshot);
        recompute_all(&mut store);
        Self::with_store(store, config)
    }

    pub fn load(source: &impl SnapshotSource, config: TrackerConfig) -> Result<Self, SnapshotError> {
        let snapshot = source.load()?;
        info!(
            projects = snapshot.projects.len(),
            big_projects = snapshot.big_projects.len(),
            "snapshot loaded"
        );
        Ok(Self::from_snapshot(snapshot, config))
    }

    fn with_store(store: EntityStore, config: TrackerConfig) -> Self {
        let store = store.with_default_priority(config.default_priority);
        let mut timeline = Timeline::default();
        timeline.recompute(&store, &config.unassigned_label);
        Self {
            store,
            timeline,
            burndown: Burndown::default(),
            burndown_target: None,
            config,
            session: None,
        }
    }

    /// Attribute subsequent mutation logs to `session`'s user.
    pub fn with_session(mut self, session: Option<SessionContext>) -> Self {
        self.session = session;
        self
    }

    // ── Accessors ────────────────────────────────────────────────────────────

    pub fn store(&self) -> &EntityStore {
        &self.store
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub fn burndown(&self) -> &Burndown {
        &self.burndown
    }

    pub fn burndown_target(&self) -> Option<BurndownTarget> {
        self.burndown_target
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    pub fn session(&self) -> Option<&SessionContext> {
        self.session.as_ref()
    }

    pub fn snapshot(&self) -> Snapshot {
        self.store.snapshot()
    }

    fn actor(&self) -> &str {
        self.session.as_ref().map_or("anonymous", |s| s.actor())
    }

    // ── Derived views ────────────────────────────────────────────────────────

    /// Choose what the burndown is drawn for, or clear it with `None`.
    pub fn select_burndown(&mut self, target: Option<BurndownTarget>) -> &Burndown {
        self.burndown_target = target;
        self.burndown = Burndown::project(&self.store, target);
        &self.burndown
    }

    pub fn search(&self, query: &str, filters: SearchFilters) -> Vec<SearchResult> {
        search::search(&self.store, query, filters)
    }

    pub fn board(&self) -> Vec<(TaskStatus, Vec<BoardCard>)> {
        board::board(&self.store)
    }

    pub fn tasks_by_status(&self, status: TaskStatus) -> Vec<BoardCard> {
        board::tasks_by_status(&self.store, status)
    }

    fn refresh(&mut self, touched: Touched) {
        match touched {
            Touched::Project(id) => {
                recompute_project_progress(&mut self.store, id);
            }
            Touched::BigProject(id) => {
                recompute_big_project_progress(&mut self.store, id);
            }
            Touched::Nothing => {}
        }
        self.timeline
            .recompute(&self.store, &self.config.unassigned_label);
        if self.burndown_target.is_some() {
            self.burndown = Burndown::project(&self.store, self.burndown_target);
        }
    }

    fn with_default_times(&self, schedule: Schedule) -> Schedule {
        schedule.or_times(self.config.default_start_time, self.config.default_end_time)
    }

    // ── Projects ─────────────────────────────────────────────────────────────

    pub fn add_project(&mut self, mut draft: ProjectDraft) -> Result<ProjectId, ValidationError> {
        draft.schedule = self.with_default_times(draft.schedule);
        let id = self.store.add_project(draft)?;
        debug!(actor = self.actor(), project_id = id, "project added");
        self.refresh(Touched::Project(id));
        Ok(id)
    }

    pub fn update_project(
        &mut self,
        id: ProjectId,
        draft: ProjectDraft,
    ) -> Result<Option<()>, ValidationError> {
        let updated = self.store.update_project(id, draft)?;
        if updated.is_none() {
            debug!(project_id = id, "update skipped, project not found");
            return Ok(None);
        }
        debug!(actor = self.actor(), project_id = id, "project updated");
        self.refresh(Touched::Project(id));
        Ok(updated)
    }

    pub fn delete_project(&mut self, id: ProjectId) -> bool {
        if !self.store.delete_project(id) {
            debug!(project_id = id, "delete skipped, project not found");
            return false;
        }
        debug!(actor = self.actor(), project_id = id, "project deleted with its tasks");
        self.refresh(Touched::Nothing);
        true
    }

    // ── Project tasks ────────────────────────────────────────────────────────

    pub fn add_task(
        &mut self,
        project_id: ProjectId,
        mut draft: TaskDraft,
    ) -> Result<Option<TaskKey>, ValidationError> {
        draft.schedule = self.with_default_times(draft.schedule);
        let key = self.store.add_task(project_id, draft)?;
        let Some(key) = key else {
            debug!(project_id, "task not added, project not found");
            return Ok(None);
        };
        debug!(actor = self.actor(), ?key, "task added");
        self.refresh(Touched::Project(project_id));
        Ok(Some(key))
    }

    pub fn update_task(
        &mut self,
        project_id: ProjectId,
        task_id: TaskId,
        draft: TaskDraft,
        status: TaskStatus,
    ) -> Result<Option<()>, ValidationError> {
        let updated = self.store.update_task(project_id, task_id, draft, status)?;
        if updated.is_none() {
            debug!(project_id, task_id, "update skipped, task not found");
            return Ok(None);
        }
        debug!(actor = self.actor(), project_id, task_id, status = status.as_str(), "task updated");
        self.refresh(Touched::Project(project_id));
        Ok(updated)
    }

    pub fn delete_task(&mut self, project_id: ProjectId, task_id: TaskId) -> bool {
        if !self.store.delete_task(project_id, task_id) {
            debug!(project_id, task_id, "delete skipped, task not found");
            return false;
        }
        debug!(actor = self.actor(), project_id, task_id, "task deleted");
        self.refresh(Touched::Project(project_id));
        true
    }

    /// Change the status of a task in either hierarchy.
    pub fn set_task_status(&mut self, key: TaskKey, status: TaskStatus) -> bool {
        if self.store.set_task_status(key, status).is_none() {
            debug!(?key, "status change skipped, task not found");
            return false;
        }
        debug!(actor = self.actor(), ?key, status = status.as_str(), "task status changed");
        let touched = match key {
            TaskKey::Project { project_id, .. } => Touched::Project(project_id),
            TaskKey::SubProject { big_project_id, .. } => Touched::BigProject(big_project_id),
        };
        self.refresh(touched);
        true
    }

    /// Create parsed CSV rows in `project_id`. Rows failing validation are
    /// skipped and counted; `None` when the project does not exist.
    pub fn import_tasks(
        &mut self,
        project_id: ProjectId,
        imported: ImportedTasks,
    ) -> Option<ImportSummary> {
        self.store.project(project_id)?;
        let mut summary = ImportSummary {
            created: 0,
            skipped: imported.skipped,
        };
        for (draft, status) in imported.tasks {
            let draft = TaskDraft {
                schedule: self.with_default_times(draft.schedule),
                ..draft
            };
            match self.store.add_task(project_id, draft) {
                Ok(Some(key)) => {
                    self.store.set_task_status(key, status);
                    summary.created += 1;
                }
                Ok(None) => summary.skipped += 1,
                Err(e) => {
                    debug!(project_id, error = %e, "imported row rejected");
                    summary.skipped += 1;
                }
            }
        }
        info!(
            actor = self.actor(),
            project_id,
            created = summary.created,
            skipped = summary.skipped,
            "tasks imported"
        );
        self.refresh(Touched::Project(project_id));
        Some(summary)
    }

    // ── Big projects ─────────────────────────────────────────────────────────

    pub fn add_big_project(&mut self, draft: BigProjectDraft) -> Result<BigProjectId, ValidationError> {
        let id = self.store.add_big_project(draft)?;
        debug!(actor = self.actor(), big_project_id = id, "big project added");
        self.refresh(Touched::BigProject(id));
        Ok(id)
    }

    pub fn update_big_project(
        &mut self,
        id: BigProjectId,
        draft: BigProjectDraft,
    ) -> Result<Option<()>, ValidationError> {
        let updated = self.store.update_big_project(id, draft)?;
        if updated.is_none() {
            debug!(big_project_id = id, "update skipped, big project not found");
            return Ok(None);
        }
        debug!(actor = self.actor(), big_project_id = id, "big project updated");
        self.refresh(Touched::BigProject(id));
        Ok(updated)
    }

    pub fn delete_big_project(&mut self, id: BigProjectId) -> bool {
        if !self.store.delete_big_project(id) {
            debug!(big_project_id = id, "delete skipped, big project not found");
            return false;
        }
        debug!(actor = self.actor(), big_project_id = id, "big project deleted with its sub-projects");
        self.refresh(Touched::Nothing);
        true
    }

    // ── Sub-projects ─────────────────────────────────────────────────────────

    pub fn add_sub_project(
        &mut self,
        big_project_id: BigProjectId,
        draft: SubProjectDraft,
    ) -> Result<Option<SubProjectId>, ValidationError> {
        let Some(id) = self.store.add_sub_project(big_project_id, draft)? else {
            debug!(big_project_id, "sub-project not added, big project not found");
            return Ok(None);
        };
        debug!(actor = self.actor(), big_project_id, sub_project_id = id, "sub-project added");
        self.refresh(Touched::BigProject(big_project_id));
        Ok(Some(id))
    }

    pub fn update_sub_project(
        &mut self,
        big_project_id: BigProjectId,
        sub_project_id: SubProjectId,
        draft: SubProjectDraft,
    ) -> Result<Option<()>, ValidationError> {
        let updated = self
            .store
            .update_sub_project(big_project_id, sub_project_id, draft)?;
        if updated.is_none() {
            debug!(big_project_id, sub_project_id, "update skipped, sub-project not found");
            return Ok(None);
        }
        debug!(actor = self.actor(), big_project_id, sub_project_id, "sub-project updated");
        self.refresh(Touched::BigProject(big_project_id));
        Ok(updated)
    }

    pub fn delete_sub_project(
        &mut self,
        big_project_id: BigProjectId,
        sub_project_id: SubProjectId,
    ) -> bool {
        if !self.store.delete_sub_project(big_project_id, sub_project_id) {
            debug!(big_project_id, sub_project_id, "delete skipped, sub-project not found");
            return false;
        }
        debug!(actor = self.actor(), big_project_id, sub_project_id, "sub-project deleted");
        self.refresh(Touched::BigProject(big_project_id));
        true
    }

    // ── Sub-project tasks ────────────────────────────────────────────────────

    pub fn add_sub_project_task(
        &mut self,
        big_project_id: BigProjectId,
        sub_project_id: SubProjectId,
        draft: TaskDraft,
    ) -> Result<Option<TaskKey>, ValidationError> {
        let Some(key) = self
            .store
            .add_sub_project_task(big_project_id, sub_project_id, draft)?
        else {
            debug!(big_project_id, sub_project_id, "task not added, sub-project not found");
            return Ok(None);
        };
        debug!(actor = self.actor(), ?key, "sub-project task added");
        self.refresh(Touched::BigProject(big_project_id));
        Ok(Some(key))
    }

    pub fn update_sub_project_task(
        &mut self,
        big_project_id: BigProjectId,
        sub_project_id: SubProjectId,
        task_id: SubProjectTaskId,
        draft: TaskDraft,
        status: TaskStatus,
    ) -> Result<Option<()>, ValidationError> {
        let updated = self.store.update_sub_project_task(
            big_project_id,
            sub_project_id,
            task_id,
            draft,
            status,
        )?;
        if updated.is_none() {
            debug!(big_project_id, sub_project_id, task_id, "update skipped, task not found");
            return Ok(None);
        }
        debug!(
            actor = self.actor(),
            big_project_id,
            sub_project_id,
            task_id,
            status = status.as_str(),
            "sub-project task updated"
        );
        self.refresh(Touched::BigProject(big_project_id));
        Ok(updated)
    }

    pub fn delete_sub_project_task(
        &mut self,
        big_project_id: BigProjectId,
        sub_project_id: SubProjectId,
        task_id: SubProjectTaskId,
    ) -> bool {
        if !self
            .store
            .delete_sub_project_task(big_project_id, sub_project_id, task_id)
        {
            debug!(big_project_id, sub_project_id, task_id, "delete skipped, task not found");
            return false;
        }
        debug!(actor = self.actor(), big_project_id, sub_project_id, task_id, "sub-project task deleted");
        self.refresh(Touched::BigProject(big_project_id));
        true
    }

    // ── Sample data ──────────────────────────────────────────────────────────

    /// Demo data: an event-planning project and a web-service big project.
    pub fn sample(config: TrackerConfig) -> Result<Self, ValidationError> {
        let mut tracker = Self::new(config);

        let project_id = tracker.add_project(ProjectDraft {
            description: "イベント企画のための内容設計プロジェクト".into(),
            category: "イベント".into(),
            ..ProjectDraft::new("イベント企画の内容設計", work_days("2024-04-01", "2024-06-30"))
        })?;
        for (title, description, status, start, end, assignee) in EVENT_TASKS {
            let draft = TaskDraft {
                description: description.to_string(),
                ..TaskDraft::new(title)
                    .with_schedule(work_days(start, end))
                    .with_assignee(assignee)
            };
            if let Some(key) = tracker.add_task(project_id, draft)? {
                tracker.set_task_status(key, status);
            }
        }

        let big_project_id = tracker.add_big_project(BigProjectDraft {
            description: "新規Webサービスの企画から開発までの包括的なプロジェクト".into(),
            start_date: date("2024-04-01"),
            end_date: date("2024-08-31"),
            budget: 30_000_000,
            status: Some(BigProjectStatus::Active),
            manager: Some("山田太郎".into()),
            priority: Some(Priority::High),
            ..BigProjectDraft::new("新規Webサービス開発プロジェクト")
        })?;
        let sub_project = SubProjectDraft {
            description: "Webサービスの設計・開発・テスト".into(),
            assignee: Some("鈴木一郎".into()),
            ..SubProjectDraft::new("Webサービス開発").with_schedule(work_days("2024-04-01", "2024-08-31"))
        };
        if let Some(sub_project_id) = tracker.add_sub_project(big_project_id, sub_project)? {
            for (title, description, status, start, end, assignee) in SERVICE_TASKS {
                let draft = TaskDraft {
                    description: description.to_string(),
                    ..TaskDraft::new(title)
                        .with_schedule(work_days(start, end))
                        .with_assignee(assignee)
                };
                if let Some(key) = tracker.add_sub_project_task(big_project_id, sub_project_id, draft)? {
                    tracker.set_task_status(key, status);
                }
            }
        }

        Ok(tracker)
    }
}

type SampleTask = (
    &'static str,
    &'static str,
    TaskStatus,
    &'static str,
    &'static str,
    &'static str,
);

const EVENT_TASKS: [SampleTask; 8] = [
    ("現状分析", "現状の分析を行う", TaskStatus::Completed, "2024-04-01", "2024-04-07", "上野"),
    ("コンセプト設定", "プロジェクトのコンセプトを設定", TaskStatus::Completed, "2024-04-08", "2024-04-14", "秋葉"),
    ("プログラム設計", "プログラムの設計を行う", TaskStatus::Completed, "2024-04-08", "2024-04-14", "神田"),
    ("告知ツールの構想設計", "告知ツールの設計", TaskStatus::Completed, "2024-04-15", "2024-04-21", "大久保"),
    ("関係企画書への落とし込み", "企画書の作成", TaskStatus::Completed, "2024-04-15", "2024-04-21", "高田"),
    ("告知・申し込みサイトの制作", "Webサイトの制作", TaskStatus::InProgress, "2024-04-22", "2024-05-07", "品川"),
    ("チラシ作成", "チラシのデザインと制作", TaskStatus::InProgress, "2024-05-01", "2024-05-14", "大塚"),
    ("メールマガジンの配信", "メールマガジンの作成と配信", TaskStatus::NotStarted, "2024-05-08", "2024-06-14", "渋谷"),
];

const SERVICE_TASKS: [SampleTask; 6] = [
    ("要件定義", "サービスの要件を定義", TaskStatus::Completed, "2024-04-01", "2024-04-15", "佐藤健一"),
    ("基本設計", "システムの基本設計を作成", TaskStatus::Completed, "2024-04-16", "2024-05-15", "田中美咲"),
    ("詳細設計", "システムの詳細設計を作成", TaskStatus::InProgress, "2024-05-16", "2024-06-15", "高橋誠"),
    ("フロントエンド開発", "フロントエンドの実装", TaskStatus::InProgress, "2024-06-01", "2024-07-31", "伊藤修"),
    ("バックエンド開発", "バックエンドの実装", TaskStatus::NotStarted, "2024-06-01", "2024-07-31", "渡辺隆"),
    ("テスト", "結合テストと総合テスト", TaskStatus::NotStarted, "2024-08-01", "2024-08-31", "木村花子"),
];

fn date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

/// 09:00 to 18:00 between two sample dates.
fn work_days(start: &str, end: &str) -> Schedule {
    Schedule {
        start_date: date(start),
        start_time: NaiveTime::from_hms_opt(9, 0, 0),
        end_date: date(end),
        end_time: NaiveTime::from_hms_opt(18, 0, 0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::csv_import::read_csv;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn sample_rolls_up_progress() {
        let tracker = Tracker::sample(TrackerConfig::default()).unwrap();
        // 5 of 8 completed, 12.5 rounds up
        assert_eq!(tracker.store().project(1).unwrap().progress, 63);
        // 2 of 6 completed
        assert_eq!(tracker.store().big_project(1).unwrap().progress, 33);
        assert_eq!(tracker.timeline().tasks().len(), 14);
        assert_eq!(tracker.timeline().months(), ["4月", "5月", "6月", "7月", "8月"]);
    }

    #[test]
    fn creation_fills_default_times() {
        let mut tracker = Tracker::new(TrackerConfig::default());
        let id = tracker
            .add_project(ProjectDraft::new("P", Schedule::new(d(2024, 4, 1), d(2024, 4, 2))))
            .unwrap();
        let schedule = &tracker.store().project(id).unwrap().schedule;
        assert_eq!(schedule.start_time, NaiveTime::from_hms_opt(9, 0, 0));
        assert_eq!(schedule.end_time, NaiveTime::from_hms_opt(17, 30, 0));
    }

    #[test]
    fn status_change_refreshes_every_view() {
        let mut tracker = Tracker::new(TrackerConfig::default());
        let id = tracker
            .add_project(ProjectDraft::new("P", Schedule::new(d(2024, 4, 1), d(2024, 4, 30))))
            .unwrap();
        let key = tracker
            .add_task(id, TaskDraft::new("t").with_schedule(Schedule::new(d(2024, 4, 1), d(2024, 4, 3))))
            .unwrap()
            .unwrap();
        tracker.select_burndown(Some(BurndownTarget::Project { id }));
        assert_eq!(tracker.burndown().points[1].completed, 0);

        assert!(tracker.set_task_status(key, TaskStatus::Completed));
        assert_eq!(tracker.store().project(id).unwrap().progress, 100);
        assert_eq!(tracker.timeline().tasks()[0].status, TaskStatus::Completed);
        assert_eq!(tracker.burndown().actual_polyline(), "0,0 100,100");
    }

    #[test]
    fn stale_references_are_no_ops() {
        let mut tracker = Tracker::new(TrackerConfig::default());
        assert_eq!(tracker.add_task(5, TaskDraft::new("x")), Ok(None));
        assert!(!tracker.delete_project(5));
        assert!(!tracker.set_task_status(
            TaskKey::SubProject {
                big_project_id: 1,
                sub_project_id: 1,
                task_id: 1
            },
            TaskStatus::Completed
        ));
        assert!(tracker.import_tasks(5, ImportedTasks::default()).is_none());
    }

    #[test]
    fn import_counts_parser_and_validation_skips() {
        let mut tracker = Tracker::new(TrackerConfig::default());
        let id = tracker
            .add_project(ProjectDraft::new("P", Schedule::new(d(2024, 4, 1), d(2024, 4, 30))))
            .unwrap();
        let imported = read_csv(
            "name;start;end;status\n\
             ok;2024-04-01;2024-04-02;done\n\
             reversed;2024-04-05;2024-04-01;done\n\
             ;2024-04-01;2024-04-02;\n",
        )
        .unwrap();
        let summary = tracker.import_tasks(id, imported).unwrap();
        assert_eq!(summary, ImportSummary { created: 1, skipped: 2 });
        assert_eq!(tracker.store().project(id).unwrap().progress, 100);
    }

    #[test]
    fn loading_recomputes_stale_progress() {
        let tracker = Tracker::sample(TrackerConfig::default()).unwrap();
        let mut snapshot = tracker.snapshot();
        snapshot.projects[0].progress = 7;
        snapshot.big_projects[0].progress = 99;
        let restored = Tracker::load(&snapshot, TrackerConfig::default()).unwrap();
        assert_eq!(restored.store().project(1).unwrap().progress, 63);
        assert_eq!(restored.store().big_project(1).unwrap().progress, 33);
        assert_eq!(restored.timeline().tasks().len(), 14);
    }
}
