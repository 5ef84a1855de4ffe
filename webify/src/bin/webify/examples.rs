use crate::commands::{leaderboard, stats, users};

#[derive(Clone, Copy)]
pub struct ExampleGroup {
    pub title: &'static str,
    pub commands: &'static [&'static str],
}

#[derive(Clone, Copy)]
pub struct CommandExample {
    pub name: &'static str,
    pub groups: &'static [ExampleGroup],
}

pub fn command_examples() -> &'static [CommandExample] {
    &[
        CommandExample {
            name: "stats",
            groups: stats::EXAMPLES,
        },
        CommandExample {
            name: "users",
            groups: users::EXAMPLES,
        },
        CommandExample {
            name: "leaderboard",
            groups: leaderboard::EXAMPLES,
        },
    ]
}
