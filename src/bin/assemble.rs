fn main() {
    arbor_dist::cli::run();
}
