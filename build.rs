fn main() {
    // Host builds (unit/integration tests) have no ESP-IDF toolchain.
    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}
