fn main() {
    // Emits ESP-IDF link/cfg directives when building for espidf targets;
    // a no-op on host targets where the relevant env vars are absent.
    embuild::espidf::sysenv::output();
}
