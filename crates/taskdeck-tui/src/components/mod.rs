pub mod comment_thread;
pub mod dashboard;
pub mod placeholder;
pub mod project_card;
pub mod project_form;
pub mod statistics_card;
pub mod task_board;
pub mod task_detail;
pub mod task_form;

/// What a form wants the app to do after a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormAction {
    None,
    Submit,
    Cancel,
}
