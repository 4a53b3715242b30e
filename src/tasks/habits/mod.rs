mod check_habits;

pub use check_habits::check_habits;
