pub mod logging;

#[cfg(test)]
mod tests {
    use super::logging;

    #[test]
    fn logging_init_accepts_levels() {
        // Should not panic, and repeat calls are fine.
        logging::init("info");
        logging::init("debug");
        logging::init("warn");
    }
}
