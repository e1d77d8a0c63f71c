fn main() {
    if let Err(e) = expenseflow_lib::run() {
        log::error!("起動に失敗しました: {}", e.details());
        eprintln!("{}", e.user_message());
        std::process::exit(1);
    }
}
