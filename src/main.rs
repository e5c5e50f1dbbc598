fn main() {
    env_logger::init();
    overpad::interface::cli::run();
}
