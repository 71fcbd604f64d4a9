use rpconv_config::{AppConfig, ConfigError};
use rpconv_engine::{BatchSummary, ConvertConfig, run_batch};
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt};

fn main() {
    let config = load_configuration();
    init_logging(&config);
    info!(
        input = %config.paths.input_dir.display(),
        output = %config.paths.output_dir.display(),
        target_version = %config.conversion.target_version,
        "启动资源包模型转换"
    );

    let convert = ConvertConfig::from(&config);
    match run_batch(&convert) {
        Ok(summary) => print_summary(&summary),
        Err(err) => {
            error!(error = %err, "批量转换无法开始");
            std::process::exit(1);
        }
    }
}

fn load_configuration() -> AppConfig {
    match AppConfig::discover() {
        Ok(cfg) => cfg,
        Err(err) => {
            match &err {
                ConfigError::Io { path, .. } | ConfigError::Parse { path, .. } => {
                    warn!(path = %path.display(), error = %err, "加载配置失败，使用内建默认值");
                }
                ConfigError::Context { .. } => {
                    warn!(error = %err, "加载配置失败，使用内建默认值");
                }
            }
            AppConfig::default()
        }
    }
}

fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_new(config.logging.level.clone()).unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = fmt().with_env_filter(filter);
    if subscriber.try_init().is_err() {
        // 已初始化，忽略
    }
}

fn print_summary(summary: &BatchSummary) {
    if summary.discovered == 0 {
        println!("没有需要转换的压缩包。");
        return;
    }

    println!("共找到压缩包：{}", summary.discovered);
    for report in &summary.converted {
        println!(
            "  - {} -> {}（转换 {} 个模型，失败 {} 个，共 {} 个文件）",
            report.archive.display(),
            report.output.display(),
            report.converted,
            report.failed,
            report.entries
        );
    }
    for archive in &summary.skipped {
        println!("  - {}：未找到物品模型，已跳过", archive.display());
    }
    for archive in &summary.failed {
        println!("  - {}：处理失败，详见日志", archive.display());
    }
    println!(
        "完成！共转换模型 {} 个，失败 {} 个。",
        summary.models_converted(),
        summary.models_failed()
    );
}
