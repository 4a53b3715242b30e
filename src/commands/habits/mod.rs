pub mod cadence;
mod add_habit;
mod check_in;
mod list_habits;
mod remove_habit;
pub mod util;

pub fn commands() -> [crate::Command; 4] {
    [
        add_habit::add_habit(),
        list_habits::list_habits(),
        check_in::check_in(),
        remove_habit::remove_habit(),
    ]
}
