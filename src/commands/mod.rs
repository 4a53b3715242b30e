pub mod habits;
mod utility;

pub fn commands() -> Vec<crate::Command> {
    habits::commands()
        .into_iter()
        .chain(utility::commands())
        .collect()
}
