use chrono::Utc;

use crate::io::store::{self, Store, StoreError};
use crate::model::config::BoardConfig;
use crate::model::task::{Priority, Task, TaskId, now_millis};
use crate::ops::import::{self, ImportBatch, ImportMode};
use crate::ops::reorder::{self, Step};
use crate::ops::suggest::OrderPlan;
use crate::ops::{bucket, task_ops};

/// Render collaborator: redraws from the current model after every mutation.
pub trait Surface {
    fn redraw(&mut self, tasks: &[Task]);
}

/// Surface that draws nothing (CLI, tests)
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSurface;

impl Surface for NullSurface {
    fn redraw(&mut self, _tasks: &[Task]) {}
}

/// The task collection together with where it is saved and shown.
///
/// Every mutation that changes something saves the whole collection to the
/// store and then asks the surface to redraw. Mutations that find nothing to
/// change do neither.
pub struct Board<S: Store, R: Surface> {
    tasks: Vec<Task>,
    config: BoardConfig,
    store: S,
    surface: R,
    persist_error: Option<StoreError>,
}

impl<S: Store, R: Surface> Board<S, R> {
    /// Load the saved collection and draw it once.
    pub fn load(store: S, surface: R, config: BoardConfig) -> Self {
        let tasks = store::load_tasks(&store);
        tracing::debug!(count = tasks.len(), "loaded tasks");
        let mut board = Board {
            tasks,
            config,
            store,
            surface,
            persist_error: None,
        };
        board.surface.redraw(&board.tasks);
        board
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn find(&self, id: TaskId) -> Option<&Task> {
        task_ops::find_task(&self.tasks, id)
    }

    pub fn config(&self) -> &BoardConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn surface(&self) -> &R {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut R {
        &mut self.surface
    }

    /// Ids in the order the render layer shows them.
    pub fn visual_order(&self) -> Vec<TaskId> {
        bucket::visual_order(&self.tasks, self.config.bucketing)
    }

    /// The most recent save failure, if any. Cleared on read.
    pub fn take_persist_error(&mut self) -> Option<StoreError> {
        self.persist_error.take()
    }

    // -----------------------------------------------------------------------
    // Mutations
    // -----------------------------------------------------------------------

    /// Create a task. Blank titles are ignored.
    pub fn add(&mut self, title: &str, description: &str) -> Option<TaskId> {
        let task = task_ops::new_task(
            &self.tasks,
            title,
            description,
            self.config.bucketing,
            Utc::now(),
        )?;
        let id = task.id;
        task_ops::insert_task(&mut self.tasks, task, self.config.insertion);
        tracing::debug!(id, "added task");
        self.commit();
        Some(id)
    }

    pub fn toggle_complete(&mut self, id: TaskId) -> bool {
        let changed = task_ops::toggle_complete(&mut self.tasks, id);
        self.commit_if(changed)
    }

    pub fn delete(&mut self, id: TaskId) -> bool {
        let changed = task_ops::delete_task(&mut self.tasks, id);
        self.commit_if(changed)
    }

    pub fn set_priority(&mut self, id: TaskId, priority: Priority) -> bool {
        let changed = task_ops::set_priority(&mut self.tasks, id, priority);
        self.commit_if(changed)
    }

    /// A task was dropped into section `group_index` (0 = A).
    pub fn reassign_on_move(&mut self, id: TaskId, group_index: usize) -> bool {
        let changed = bucket::reassign_on_move(&mut self.tasks, id, group_index);
        self.commit_if(changed)
    }

    /// Discard the collection and take `tasks` as the new one.
    pub fn replace_all(&mut self, tasks: Vec<Task>) {
        self.tasks = tasks;
        self.commit();
    }

    /// Append `tasks` with fresh ids. Returns how many were added.
    pub fn merge_all(&mut self, tasks: Vec<Task>) -> usize {
        if tasks.is_empty() {
            return 0;
        }
        let added = task_ops::merge_tasks(&mut self.tasks, tasks, now_millis());
        self.commit();
        added
    }

    /// Bring in a validated import batch.
    pub fn import(&mut self, batch: ImportBatch, mode: ImportMode) -> usize {
        match mode {
            ImportMode::Merge => self.merge_all(batch.tasks),
            ImportMode::Replace => {
                let tasks = import::prepare_replacement(batch.tasks, now_millis());
                let count = tasks.len();
                self.replace_all(tasks);
                count
            }
        }
    }

    /// Adopt `ids_in_visual_order` as the order the view shows. With buckets
    /// the ids fill the existing section slots, so tasks take the letter of
    /// the section they land in. Returns false when nothing changed.
    pub fn recompute_order(&mut self, ids_in_visual_order: &[TaskId]) -> bool {
        if self.config.bucketing {
            let sections = reorder::fill_sections(&self.tasks, ids_in_visual_order);
            return self.recompute_sections(&sections);
        }
        let ordered = reorder::recompute_order(&self.tasks, ids_in_visual_order);
        self.replace_if_changed(ordered)
    }

    /// Adopt the order and section membership the view shows (buckets).
    pub fn recompute_sections(&mut self, sections: &[Vec<TaskId>]) -> bool {
        let ordered = reorder::recompute_sections(&self.tasks, sections);
        self.replace_if_changed(ordered)
    }

    /// What [`recompute_order`](Self::recompute_order) would produce.
    pub fn preview_order(&self, ids_in_visual_order: &[TaskId]) -> Vec<Task> {
        reorder::arrange(&self.tasks, ids_in_visual_order, self.config.bucketing)
    }

    pub fn move_up(&mut self, id: TaskId) -> bool {
        self.step(id, Step::Up)
    }

    pub fn move_down(&mut self, id: TaskId) -> bool {
        self.step(id, Step::Down)
    }

    fn step(&mut self, id: TaskId, step: Step) -> bool {
        match reorder::step_task(&self.tasks, id, step, self.config.bucketing) {
            Some(ordered) => {
                self.tasks = ordered;
                self.commit();
                true
            }
            None => false,
        }
    }

    /// Apply a confirmed suggestion. Returns false when it changes nothing.
    pub fn apply_plan(&mut self, plan: &OrderPlan) -> bool {
        self.recompute_order(&plan.order)
    }

    /// Re-read the collection from the store (another process wrote it).
    pub fn reload(&mut self) {
        self.tasks = store::load_tasks(&self.store);
        tracing::debug!(count = self.tasks.len(), "reloaded tasks");
        self.surface.redraw(&self.tasks);
    }

    /// Saved theme preference; `None` when never set.
    pub fn dark_mode(&self) -> Option<bool> {
        store::load_dark_mode(&self.store)
    }

    pub fn set_dark_mode(&mut self, dark: bool) {
        if let Err(e) = store::save_dark_mode(&mut self.store, dark) {
            tracing::error!(error = %e, "failed to save theme preference");
            self.persist_error = Some(e);
        }
        self.surface.redraw(&self.tasks);
    }

    // -----------------------------------------------------------------------
    // Persistence
    // -----------------------------------------------------------------------

    fn replace_if_changed(&mut self, ordered: Vec<Task>) -> bool {
        if ordered == self.tasks {
            return false;
        }
        self.tasks = ordered;
        self.commit();
        true
    }

    fn commit_if(&mut self, changed: bool) -> bool {
        if changed {
            self.commit();
        }
        changed
    }

    fn commit(&mut self) {
        self.persist();
        self.surface.redraw(&self.tasks);
    }

    /// Save the whole collection. Failures are logged and kept for
    /// [`take_persist_error`](Self::take_persist_error); the in-memory
    /// collection stays as it is.
    fn persist(&mut self) {
        if let Err(e) = store::save_tasks(&mut self.store, &self.tasks) {
            tracing::error!(error = %e, "failed to save tasks");
            self.persist_error = Some(e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::store::{MemoryStore, TODOS_KEY};
    use crate::model::config::InsertionOrder;
    use crate::ops::suggest;
    use pretty_assertions::assert_eq;

    /// Counts redraws and remembers the last titles drawn
    #[derive(Default)]
    struct Recorder {
        redraws: usize,
        last: Vec<String>,
    }

    impl Surface for Recorder {
        fn redraw(&mut self, tasks: &[Task]) {
            self.redraws += 1;
            self.last = tasks.iter().map(|t| t.title.clone()).collect();
        }
    }

    fn board(config: BoardConfig) -> Board<MemoryStore, Recorder> {
        Board::load(MemoryStore::new(), Recorder::default(), config)
    }

    fn titles<S: Store, R: Surface>(board: &Board<S, R>) -> Vec<&str> {
        board.tasks().iter().map(|t| t.title.as_str()).collect()
    }

    #[test]
    fn add_then_read_back() {
        let mut b = board(BoardConfig::default());
        let id = b.add("Plan sprint", "").unwrap();
        let task = b.find(id).unwrap();
        assert_eq!(task.title, "Plan sprint");
        assert!(!task.completed);
        assert_eq!(task.priority, Some(Priority::C));

        let saved = store::load_tasks(b.store());
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].id, id);
    }

    #[test]
    fn add_respects_insertion_order() {
        let mut front = board(BoardConfig::default());
        front.add("first", "");
        front.add("second", "");
        assert_eq!(titles(&front), vec!["second", "first"]);

        let mut back = board(BoardConfig {
            insertion: InsertionOrder::Back,
            ..Default::default()
        });
        back.add("first", "");
        back.add("second", "");
        assert_eq!(titles(&back), vec!["first", "second"]);
    }

    #[test]
    fn add_without_buckets_leaves_priority_unset() {
        let mut b = board(BoardConfig {
            bucketing: false,
            ..Default::default()
        });
        let id = b.add("flat", "").unwrap();
        assert_eq!(b.find(id).unwrap().priority, None);
    }

    #[test]
    fn empty_title_is_a_noop() {
        let mut b = board(BoardConfig::default());
        let redraws = b.surface().redraws;
        assert_eq!(b.add("", "desc"), None);
        assert_eq!(b.add("   ", ""), None);
        assert!(b.is_empty());
        assert_eq!(b.store().write_count(), 0);
        assert_eq!(b.surface().redraws, redraws);
    }

    #[test]
    fn double_toggle_restores_and_persists_twice() {
        let mut b = board(BoardConfig::default());
        let id = b.add("Toggle me", "").unwrap();
        let writes = b.store().write_count();

        assert!(b.toggle_complete(id));
        assert!(b.find(id).unwrap().completed);
        assert!(b.toggle_complete(id));
        assert!(!b.find(id).unwrap().completed);
        assert_eq!(b.store().write_count(), writes + 2);
    }

    #[test]
    fn unknown_ids_do_not_persist() {
        let mut b = board(BoardConfig::default());
        b.add("only", "");
        let writes = b.store().write_count();
        assert!(!b.toggle_complete(42));
        assert!(!b.delete(42));
        assert!(!b.set_priority(42, Priority::A));
        assert!(!b.reassign_on_move(42, 0));
        assert_eq!(b.store().write_count(), writes);
    }

    #[test]
    fn every_mutation_redraws_after_saving() {
        let mut b = board(BoardConfig::default());
        let id = b.add("draw me", "").unwrap();
        assert_eq!(b.surface().last, vec!["draw me"]);
        b.delete(id);
        assert!(b.surface().last.is_empty());
        // one redraw on load, one per mutation
        assert_eq!(b.surface().redraws, 3);
    }

    #[test]
    fn reassign_on_move_sets_letter_and_persists() {
        let mut b = board(BoardConfig::default());
        let id = b.add("move", "").unwrap();
        assert!(b.reassign_on_move(id, 1));
        assert_eq!(b.find(id).unwrap().priority, Some(Priority::B));
        assert!(!b.reassign_on_move(id, 7));
        let saved = store::load_tasks(b.store());
        assert_eq!(saved[0].priority, Some(Priority::B));
    }

    #[test]
    fn recompute_order_drops_unknown_ids() {
        let mut b = board(BoardConfig {
            insertion: InsertionOrder::Back,
            bucketing: false,
            ..Default::default()
        });
        let a = b.add("a", "").unwrap();
        let c = b.add("c", "").unwrap();
        let d = b.add("d", "").unwrap();
        b.recompute_order(&[d, 999_999, a, c]);
        assert_eq!(titles(&b), vec!["d", "a", "c"]);
    }

    #[test]
    fn unchanged_order_is_not_saved() {
        let mut b = board(BoardConfig::default());
        b.add("a", "");
        b.add("b", "");
        let writes = b.store().write_count();
        let ids = b.visual_order();
        b.recompute_order(&ids);
        assert_eq!(b.store().write_count(), writes);
    }

    #[test]
    fn keyboard_moves_cross_buckets() {
        let mut b = board(BoardConfig {
            insertion: InsertionOrder::Back,
            ..Default::default()
        });
        let a = b.add("a", "").unwrap();
        let c = b.add("c", "").unwrap();
        assert!(b.move_up(c));
        assert_eq!(b.visual_order(), vec![c, a]);
        assert!(b.move_up(c));
        assert_eq!(b.find(c).unwrap().priority, Some(Priority::B));
        assert!(b.move_down(c));
        assert_eq!(b.find(c).unwrap().priority, Some(Priority::C));
    }

    #[test]
    fn rejected_writes_keep_memory_state() {
        let mut b = Board::load(MemoryStore::rejecting(), NullSurface, BoardConfig::default());
        let id = b.add("survives", "").unwrap();
        assert_eq!(b.find(id).unwrap().title, "survives");
        assert!(matches!(b.take_persist_error(), Some(StoreError::Rejected(_))));
        assert!(b.take_persist_error().is_none());
    }

    #[test]
    fn corrupt_saved_blob_loads_empty() {
        let mut store = MemoryStore::new();
        store.set(TODOS_KEY, "[{broken").unwrap();
        let b = Board::load(store, NullSurface, BoardConfig::default());
        assert!(b.is_empty());
    }

    #[test]
    fn import_modes() {
        let mut b = board(BoardConfig::default());
        b.add("existing", "");
        let json = r#"{"version":"1.0","tasks":[{"id":5,"title":"one","priority":"C"},{"id":6,"title":"two","priority":"A"}]}"#;

        let merged = b.import(import::parse_import(json, true).unwrap(), ImportMode::Merge);
        assert_eq!(merged, 2);
        assert_eq!(b.len(), 3);
        assert!(b.tasks().iter().all(|t| t.priority.is_some()));

        let replaced = b.import(import::parse_import(json, true).unwrap(), ImportMode::Replace);
        assert_eq!(replaced, 2);
        assert_eq!(titles(&b), vec!["one", "two"]);
        assert_eq!(b.tasks()[0].id, 5);
    }

    #[test]
    fn apply_plan_reorders_and_saves() {
        let mut b = board(BoardConfig {
            insertion: InsertionOrder::Back,
            bucketing: false,
            ..Default::default()
        });
        b.add("Write the report", "");
        b.add("Buy groceries", "");
        b.add("Call dentist", "");
        let text = "Ranked Priority List:\n1. Call dentist\n2. Write report\n";
        let plan = suggest::plan_from_text(b.tasks(), text).unwrap();
        assert!(b.apply_plan(&plan));
        assert_eq!(titles(&b), vec!["Call dentist", "Write the report", "Buy groceries"]);
    }

    #[test]
    fn bucketed_recompute_order_changes_what_is_shown() {
        let mut b = board(BoardConfig {
            insertion: InsertionOrder::Back,
            ..Default::default()
        });
        let x = b.add("x", "").unwrap();
        let y = b.add("y", "").unwrap();
        b.set_priority(y, Priority::A);
        assert_eq!(b.visual_order(), vec![y, x]);

        assert!(b.recompute_order(&[x, y]));
        assert_eq!(b.visual_order(), vec![x, y]);
        assert_eq!(b.find(x).unwrap().priority, Some(Priority::A));
        assert_eq!(b.find(y).unwrap().priority, Some(Priority::C));
        let saved = store::load_tasks(b.store());
        assert_eq!(bucket::visual_order(&saved, true), vec![x, y]);
    }

    #[test]
    fn bucketed_plan_is_applied_as_shown() {
        let mut b = board(BoardConfig {
            insertion: InsertionOrder::Back,
            ..Default::default()
        });
        let report = b.add("Write the report", "").unwrap();
        let groceries = b.add("Buy groceries", "").unwrap();
        b.set_priority(groceries, Priority::A);
        let text = "Recommended order:\n1. Write the report\n2. Buy groceries\n";
        let plan = suggest::plan_from_text(b.tasks(), text).unwrap();
        assert!(!plan.is_unchanged(&b.visual_order()));

        let preview = b.preview_order(&plan.order);
        assert!(b.apply_plan(&plan));
        assert_eq!(b.tasks(), preview.as_slice());
        assert_eq!(b.visual_order(), vec![report, groceries]);
        assert!(plan.is_unchanged(&b.visual_order()));
        assert!(!b.apply_plan(&plan));
    }

    #[test]
    fn dark_mode_is_saved() {
        let mut b = board(BoardConfig::default());
        assert_eq!(b.dark_mode(), None);
        b.set_dark_mode(true);
        assert_eq!(b.dark_mode(), Some(true));
    }
}
