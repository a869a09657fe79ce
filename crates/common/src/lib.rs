//! Shared building blocks for the song service crates: the health payload
//! and tracing subscriber setup.

pub mod types;
pub mod utils;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_type_ok() {
        let h = types::Health::ok();
        assert_eq!(h.status, "ok");
    }

    #[test]
    fn logging_init_is_idempotent() {
        utils::logging::init_logging_default();
        utils::logging::init_logging_json();
    }
}
