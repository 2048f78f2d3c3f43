/// Creates a single [`Message`](crate::Message) from a role shorthand.
///
/// ```rust
/// use specagent::{Role, sa_msg};
///
/// let message = sa_msg!(user => "List the pets.");
/// assert_eq!(message.role, Role::User);
/// assert_eq!(message.content, "List the pets.");
/// ```
#[macro_export]
macro_rules! sa_msg {
    (system => $content:expr $(,)?) => {
        $crate::Message::new($crate::Role::System, $content)
    };
    (user => $content:expr $(,)?) => {
        $crate::Message::new($crate::Role::User, $content)
    };
    (assistant => $content:expr $(,)?) => {
        $crate::Message::new($crate::Role::Assistant, $content)
    };
    (tool => $content:expr $(,)?) => {
        $crate::Message::new($crate::Role::Tool, $content)
    };
    ($role:ident => $content:expr $(,)?) => {
        compile_error!("unsupported role: use system, user, assistant, or tool");
    };
}

/// Creates a `Vec<Message>` from role/content pairs.
///
/// ```rust
/// use specagent::{Role, sa_messages};
///
/// let messages = sa_messages![
///     user => "Find pet 7.",
///     assistant => "Pet 7 is a cat named Tom.",
///     user => "And pet 8?",
/// ];
///
/// assert_eq!(messages.len(), 3);
/// assert_eq!(messages[1].role, Role::Assistant);
/// ```
#[macro_export]
macro_rules! sa_messages {
    () => {
        Vec::<$crate::Message>::new()
    };
    ($($role:ident => $content:expr),+ $(,)?) => {
        vec![$($crate::sa_msg!($role => $content)),+]
    };
}
