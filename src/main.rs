use keycrate::error::AppResult;

fn main() -> AppResult<()> {
    keycrate::entry::run()
}
