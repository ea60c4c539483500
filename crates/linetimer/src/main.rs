use linetimer::cli::{main_with, Variant};

fn main() {
    std::process::exit(main_with(Variant::LineTimer));
}
