fn main() -> anyhow::Result<()> {
    sharpts_cli::run()
}
