fn main() -> anyhow::Result<()> {
    chess_alarm_lib::run()
}
