use crate::commands::*;
use crate::config::AppConfig;
use crate::output::*;
use crate::render::SvgRenderer;
use log::debug;
use reading::TimeRange;
use sensorgraph_core::settings::normalize_settings;
use sensorgraph_core::{
    CancelToken, Pipeline, PipelineResult, PipelineSettings, ReadingSource, Renderer,
};
use sensorgraph_fetch::{now_millis, FileSource};
use std::path::{Path, PathBuf};

pub fn handle_command(command: Commands) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Commands::Run { config, svg, json } => {
            handle_run(config.as_deref(), svg.as_deref(), json)?
        }
        Commands::Files {
            paths,
            svg,
            json,
            min_readings,
            width,
            height,
            time_scaled,
        } => {
            let mut settings = PipelineSettings::default();
            if let Some(min_readings) = min_readings {
                settings.minimum_readings = min_readings;
            }
            if let Some(width) = width {
                settings.width = width;
            }
            if let Some(height) = height {
                settings.height = height;
            }
            settings.time_scaled = time_scaled;
            handle_files(paths, normalize_settings(settings), svg.as_deref(), json)?
        }
        Commands::Config { command } => handle_config_command(command)?,
    }
    Ok(())
}

fn handle_run(
    config_path: Option<&Path>,
    svg: Option<&Path>,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let (config, loaded_from) = AppConfig::resolve(config_path)?;
    match &loaded_from {
        Some(path) => debug!("loaded config from {}", path.display()),
        None => debug!("no config file, using defaults"),
    }
    let source = config.source.build();
    let range = TimeRange::trailing(now_millis(), config.pipeline.window_ms);
    let pipeline = Pipeline::new(config.pipeline);
    execute(&pipeline, &*source, &range, svg, json)
}

fn handle_files(
    paths: Vec<PathBuf>,
    settings: PipelineSettings,
    svg: Option<&Path>,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let source = FileSource::new(paths).with_fields(settings.fields.clone());
    let range = TimeRange::trailing(now_millis(), settings.window_ms);
    let pipeline = Pipeline::new(settings);
    execute(&pipeline, &source, &range, svg, json)
}

fn execute(
    pipeline: &Pipeline,
    source: &dyn ReadingSource,
    range: &TimeRange,
    svg: Option<&Path>,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let cancel = CancelToken::new();
    let result = pipeline.try_run(source, range, &cancel)?;
    if let Some(path) = svg {
        let mut renderer = SvgRenderer::new(path);
        renderer.render(&result, pipeline.settings().viewport())?;
        if !json {
            print_info(&format!("Chart written to {}", path.display()));
        }
    }
    report(&result, json)
}

fn report(result: &PipelineResult, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    if json {
        print_json(result)?;
    } else {
        print_summary(result);
    }
    Ok(())
}

fn handle_config_command(command: ConfigCommands) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        ConfigCommands::Show { config } => {
            let (config, loaded_from) = AppConfig::resolve(config.as_deref())?;
            match loaded_from {
                Some(path) => print_info(&format!("Config from {}", path.display())),
                None => print_info("No config file, showing defaults"),
            }
            print!("{}", config.to_toml()?);
        }
        ConfigCommands::Init { path } => {
            AppConfig::default().create(&path)?;
            print_info(&format!("Config written to {}", path.display()));
        }
    }
    Ok(())
}
