pub mod category_tree;
pub mod history;
pub mod session;
pub mod task_store;
pub mod urgent_queue;
