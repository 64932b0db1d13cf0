fn main() {
    // ESP-IDF link arguments are only needed when building for hardware.
    // Host builds (simulator, tests) need nothing from the build script.
    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}
