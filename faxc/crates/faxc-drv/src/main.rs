fn main() {
    if let Err(e) = faxc_drv::main() {
        eprintln!("{e}");
        std::process::exit(1);
    }
}
