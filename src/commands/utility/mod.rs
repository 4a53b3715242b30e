mod ping;

pub fn commands() -> [crate::Command; 1] {
    [ping::ping()]
}
