fn main() -> Result<(), Box<dyn std::error::Error>> {
    jarscope_cli::run()
}
