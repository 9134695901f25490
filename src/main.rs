// projeto: lstmsocdata
// file: src/main.rs
// CLI: extrai, escala e janela os ciclos de descarga configurados

use clap::Parser;
use log::{error, info};
use std::path::PathBuf;
use std::time::Instant;

use lstmsocdata::battery::config::PipelineConfig;
use lstmsocdata::battery::cycle::DegeneratePolicy;
use lstmsocdata::battery::pipeline::DischargePipeline;
use lstmsocdata::battery::sliding::WindowBoundary;
use lstmsocdata::battery::source::CsvCycleSource;
use lstmsocdata::battery::utils::DataError;

#[derive(Parser, Debug)]
#[command(
    name = "socdata",
    version,
    about = "Prepara ciclos de descarga LG HG2 em tensores para modelos de SoC",
    long_about = "Extrai features (tensão, corrente, temperatura) e targets (SoC) de cada ciclo, \
                  escala as features com min-max ajustado no treino e gera janelas stateful ou multi-step."
)]
struct Cli {
    /// Arquivo de configuração TOML (padrão: socdata.toml, se existir)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Diretório base dos CSV
    #[arg(long)]
    base_path: Option<PathBuf>,

    /// Ciclos de treino, separados por vírgula (ex: 25degC/551_LA92)
    #[arg(long, value_delimiter = ',')]
    train: Option<Vec<String>>,

    /// Ciclos de teste, separados por vírgula
    #[arg(long, value_delimiter = ',')]
    test: Option<Vec<String>>,

    /// Comprimento de cada janela
    #[arg(long)]
    steps: Option<usize>,

    /// Janelas stateful (4-D) em vez de multi-step (3-D)
    #[arg(long)]
    stateful: Option<bool>,

    /// Valor usado no padding
    #[arg(long, allow_hyphen_values = true)]
    pad_value: Option<f64>,

    /// Target em Ah em vez de percentual
    #[arg(long)]
    output_capacity: bool,

    /// Adiciona o tempo decorrido (s) como target
    #[arg(long)]
    output_time: bool,

    /// Aplica a escala do treino também no teste
    #[arg(long)]
    scale_test: bool,

    /// Mantém apenas o último passo de cada janela de target
    #[arg(long)]
    keep_only_y_end: bool,

    /// Mantém a última janela completa nas janelas multi-step
    #[arg(long)]
    inclusive_boundary: bool,

    /// Ciclos com SoC máximo zero recebem percentual 0 em vez de erro
    #[arg(long)]
    zero_degenerate: bool,

    /// Extração paralela dos ciclos
    #[arg(long)]
    parallel: bool,

    /// Imprime o resumo da execução em JSON
    #[arg(long)]
    summary_json: bool,

    /// Modo verboso de logging
    #[arg(long)]
    verbose: bool,
}

impl Cli {
    fn apply(&self, config: &mut PipelineConfig) {
        if let Some(path) = &self.base_path {
            config.data.base_path = path.clone();
        }
        if let Some(names) = &self.train {
            config.data.train_names = names.clone();
        }
        if let Some(names) = &self.test {
            config.data.test_names = names.clone();
        }
        if let Some(steps) = self.steps {
            config.windowing.steps = steps;
        }
        if let Some(stateful) = self.stateful {
            config.windowing.is_stateful = stateful;
        }
        if let Some(pad) = self.pad_value {
            config.windowing.pad_value = pad;
        }
        config.extraction.output_capacity |= self.output_capacity;
        config.extraction.output_time |= self.output_time;
        config.extraction.parallel |= self.parallel;
        config.scaling.scale_test |= self.scale_test;
        config.windowing.keep_only_y_end |= self.keep_only_y_end;
        if self.inclusive_boundary {
            config.windowing.boundary = WindowBoundary::Inclusive;
        }
        if self.zero_degenerate {
            config.extraction.degenerate_policy = DegeneratePolicy::Zero;
        }
    }
}

fn setup_logging(verbose: bool) {
    let level = if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::from_default_env()
        .filter_level(level)
        .format_timestamp_secs()
        .init();
}

fn run(cli: &Cli) -> Result<(), DataError> {
    let mut config = PipelineConfig::load(cli.config.as_deref())?;
    cli.apply(&mut config);
    config.validate()?;

    info!(
        "Train: {} cycles | Test: {} cycles | steps: {} | stateful: {}",
        config.data.train_names.len(),
        config.data.test_names.len(),
        config.windowing.steps,
        config.windowing.is_stateful
    );

    let source = CsvCycleSource::new(&config.data.base_path, config.data.header_lines);
    let pipeline = DischargePipeline::new(source, config);
    let output = pipeline.run()?;

    let summary = output.summary(pipeline.config());
    info!("Train cycles: {} | Test cycles: {}", summary.train_cycles, summary.test_cycles);
    if cli.summary_json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    }
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    let start_time = Instant::now();
    match run(&cli) {
        Ok(()) => info!("Concluído em {:.2}s", start_time.elapsed().as_secs_f64()),
        Err(e) => {
            error!("Erro: {}", e);
            std::process::exit(1);
        }
    }
}
