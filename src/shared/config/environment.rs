/// アプリケーションの実行環境を表す列挙型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    /// 開発環境
    Development,
    /// プロダクション環境
    Production,
}

impl Environment {
    /// 環境名の文字列から実行環境を判定する
    ///
    /// "production" 以外はすべて開発環境として扱う。
    pub fn from_name(name: &str) -> Self {
        match name {
            "production" => Environment::Production,
            _ => Environment::Development,
        }
    }

    /// 小文字の環境名を取得
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Production => "production",
        }
    }
}

/// 環境設定を管理する構造体
#[derive(Debug, Clone)]
pub struct EnvironmentConfig {
    /// 実行環境
    pub environment: Environment,
    /// デバッグモードの有効/無効
    pub debug_mode: bool,
    /// ログレベル
    pub log_level: String,
}

impl EnvironmentConfig {
    /// 環境変数から設定を読み込む
    ///
    /// # 戻り値
    /// 環境設定
    pub fn from_env() -> Self {
        let environment = get_environment();
        let log_level = std::env::var("LOG_LEVEL").ok();
        Self::new(environment, log_level)
    }

    /// 実行環境と任意のログレベルから設定を組み立てる
    ///
    /// ログレベル未指定時は開発環境で "debug"、プロダクション環境で "info" を使う。
    pub fn new(environment: Environment, log_level: Option<String>) -> Self {
        let debug_mode = environment == Environment::Development;
        let log_level = log_level.unwrap_or_else(|| {
            if debug_mode {
                "debug".to_string()
            } else {
                "info".to_string()
            }
        });

        Self {
            environment,
            debug_mode,
            log_level,
        }
    }

    /// プロダクション環境かどうかを判定
    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }

    /// 開発環境かどうかを判定
    pub fn is_development(&self) -> bool {
        self.environment == Environment::Development
    }

    /// 設定文字列をログレベルフィルタに変換する（不明な値はInfo）
    pub fn level_filter(&self) -> log::LevelFilter {
        match self.log_level.to_lowercase().as_str() {
            "error" => log::LevelFilter::Error,
            "warn" => log::LevelFilter::Warn,
            "info" => log::LevelFilter::Info,
            "debug" => log::LevelFilter::Debug,
            "trace" => log::LevelFilter::Trace,
            _ => log::LevelFilter::Info,
        }
    }
}

/// 現在の実行環境を判定する
///
/// # 判定ロジック
/// 1. 実行時環境変数 ENVIRONMENT を確認
/// 2. デバッグビルドの場合は Development
/// 3. リリースビルドの場合は Production
pub fn get_environment() -> Environment {
    if let Ok(env_var) = std::env::var("ENVIRONMENT") {
        let env = Environment::from_name(&env_var);
        log::debug!("環境判定: 実行時環境変数を使用 -> {env_var} -> {env:?}");
        return env;
    }

    // フォールバック: ビルド設定に基づく判定
    let env = if cfg!(debug_assertions) {
        Environment::Development
    } else {
        Environment::Production
    };
    log::debug!(
        "環境判定: ビルド設定を使用 -> debug_assertions={} -> {env:?}",
        cfg!(debug_assertions)
    );
    env
}

/// 環境に応じたデータベースファイル名を取得する
///
/// # ファイル名の規則
/// - 開発環境: "dev_expenseflow.db"
/// - プロダクション環境: "expenseflow.db"
pub fn get_database_filename(env: Environment) -> &'static str {
    match env {
        Environment::Development => "dev_expenseflow.db",
        Environment::Production => "expenseflow.db",
    }
}

/// 環境に応じた.envファイルを読み込む
///
/// 環境固有のファイルが無い場合はデフォルトの.envを試す。
/// どちらも無ければ、直接設定された環境変数だけを使う。
pub fn load_environment_variables() {
    let environment = std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());

    let env_file = match Environment::from_name(&environment) {
        Environment::Production => ".env.production",
        Environment::Development => ".env",
    };

    log::info!("環境: {environment}, 読み込み対象: {env_file}");

    match dotenv::from_filename(env_file) {
        Ok(_) => {
            log::info!("{env_file}ファイルを読み込みました");
        }
        Err(_) => {
            if env_file != ".env" {
                match dotenv::dotenv() {
                    Ok(_) => {
                        log::warn!("{env_file}が見つからないため、デフォルトの.envファイルを読み込みました");
                    }
                    Err(_) => {
                        log::warn!("環境変数ファイルが見つかりません。直接設定された環境変数を使用します。");
                    }
                }
            } else {
                log::warn!(".envファイルが見つかりません。直接設定された環境変数を使用します。");
            }
        }
    }
}

/// ログシステムを初期化する
///
/// # 処理内容
/// 1. ログレベルを設定
/// 2. env_loggerを初期化（二重初期化は無視する）
pub fn initialize_logging_system(env_config: &EnvironmentConfig) {
    let initialized = env_logger::Builder::from_default_env()
        .filter_level(env_config.level_filter())
        .format_timestamp_secs()
        .format_module_path(false)
        .format_target(false)
        .try_init()
        .is_ok();

    if initialized {
        log::info!(
            "ログシステムを初期化しました: level={}, environment={}",
            env_config.log_level,
            env_config.environment.as_str()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_from_name() {
        assert_eq!(Environment::from_name("production"), Environment::Production);
        assert_eq!(Environment::from_name("development"), Environment::Development);
        assert_eq!(Environment::from_name("staging"), Environment::Development);
    }

    #[test]
    fn test_database_filename() {
        assert_eq!(
            get_database_filename(Environment::Development),
            "dev_expenseflow.db"
        );
        assert_eq!(
            get_database_filename(Environment::Production),
            "expenseflow.db"
        );
    }

    #[test]
    fn test_default_log_level_per_environment() {
        let dev = EnvironmentConfig::new(Environment::Development, None);
        assert_eq!(dev.log_level, "debug");
        assert!(dev.debug_mode);
        assert!(dev.is_development());

        let prod = EnvironmentConfig::new(Environment::Production, None);
        assert_eq!(prod.log_level, "info");
        assert!(!prod.debug_mode);
        assert!(prod.is_production());
    }

    #[test]
    fn test_level_filter() {
        let config = EnvironmentConfig::new(Environment::Production, Some("WARN".to_string()));
        assert_eq!(config.level_filter(), log::LevelFilter::Warn);

        let unknown = EnvironmentConfig::new(Environment::Production, Some("loud".to_string()));
        assert_eq!(unknown.level_filter(), log::LevelFilter::Info);
    }
}
