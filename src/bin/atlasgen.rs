fn main() {
    env_logger::init();
    std::process::exit(atlasgen::cli::run());
}
