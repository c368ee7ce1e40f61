/// Creates a single [`ChatMessage`](crate::ChatMessage) from a role shorthand.
///
/// ```rust
/// use lattice::{Role, lt_msg};
///
/// let message = lt_msg!(assistant => "Done.");
/// assert_eq!(message.role, Role::Assistant);
/// assert_eq!(message.text_content(), "Done.");
/// ```
#[macro_export]
macro_rules! lt_msg {
    (user => $content:expr $(,)?) => {
        $crate::util::user_message($content)
    };
    (assistant => $content:expr $(,)?) => {
        $crate::util::assistant_message($content)
    };
    ($role:ident => $content:expr $(,)?) => {
        compile_error!("unsupported role: use user or assistant")
    };
}

/// Creates a `Vec<ChatMessage>` from role/content pairs.
///
/// ```rust
/// use lattice::{Role, lt_messages};
///
/// let messages = lt_messages![
///     user => "Who won in 1998?",
///     assistant => "France.",
///     user => "Who scored?",
/// ];
///
/// assert_eq!(messages.len(), 3);
/// assert_eq!(messages[2].role, Role::User);
/// ```
#[macro_export]
macro_rules! lt_messages {
    () => {
        Vec::<$crate::ChatMessage>::new()
    };
    ($($role:ident => $content:expr),+ $(,)?) => {
        vec![$($crate::lt_msg!($role => $content)),+]
    };
}

/// Creates an [`ActivityConfig`](crate::ActivityConfig), optionally with
/// local tools and tool providers.
///
/// ```rust
/// use lattice::{LocalTool, lt_activity};
///
/// let activity = lt_activity!(
///     "trivia",
///     "gpt-4o-mini",
///     "Host a quiz for {{userId}}.",
///     local: [memory],
///     providers: ["trivia" => "http://localhost:8003/mcp"],
/// );
///
/// assert!(activity.has_local_tool(LocalTool::Memory));
/// assert_eq!(activity.provider_names(), vec!["trivia".to_string()]);
/// ```
#[macro_export]
macro_rules! lt_activity {
    ($id:expr, $model:expr, $prompt:expr $(,)?) => {
        $crate::util::activity($id, $model, $prompt)
    };
    (
        $id:expr, $model:expr, $prompt:expr,
        local: [$($tool:ident),* $(,)?]
        $(, providers: [$($name:expr => $endpoint:expr),* $(,)?])?
        $(,)?
    ) => {
        $crate::util::activity($id, $model, $prompt)
            $(.with_local_tool($crate::lt_local_tool!($tool)))*
            $($(.with_provider($crate::util::provider($name, $endpoint)))*)?
    };
    (
        $id:expr, $model:expr, $prompt:expr,
        providers: [$($name:expr => $endpoint:expr),* $(,)?]
        $(,)?
    ) => {
        $crate::util::activity($id, $model, $prompt)
            $(.with_provider($crate::util::provider($name, $endpoint)))*
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! lt_local_tool {
    (memory) => {
        $crate::LocalTool::Memory
    };
    ($other:ident) => {
        compile_error!("unsupported local tool: use memory")
    };
}
