use std::fs::File;
use std::io::{self, Stdout};
use std::thread;
use std::time::{Duration, Instant};

use clap::Parser;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use env_logger::{Env, Target};
use log::{error, info};
use rand::rngs::StdRng;
use rand::SeedableRng;

use maze_game::render::{Celebration, Renderer, TerminalGuard};
use maze_game::{Args, Dir, GameConfig, LevelController, LevelEvent, Result};

const SPARK_FALL_MS: u64 = 60;

fn main() -> Result<()> {
    let config = GameConfig::from_args(Args::parse())?;
    init_logging(&config)?;

    let mut terminal = TerminalGuard::enter(io::stdout())?;
    let result = run(terminal.writer(), &config);
    drop(terminal);

    if let Err(err) = &result {
        error!("game aborted: {}", err);
    }
    result
}

fn init_logging(config: &GameConfig) -> Result<()> {
    match &config.log_file {
        Some(path) => {
            let file = File::create(path)?;
            env_logger::Builder::from_env(Env::default().default_filter_or("info"))
                .target(Target::Pipe(Box::new(file)))
                .init();
        }
        // Anything written to stderr would land on top of the maze.
        None => env_logger::Builder::from_env(Env::default().default_filter_or("off")).init(),
    }
    Ok(())
}

fn run(stdout: &mut Stdout, config: &GameConfig) -> Result<()> {
    let rng = match config.seed {
        Some(seed) => {
            info!("using seed {}", seed);
            StdRng::seed_from_u64(seed)
        }
        None => StdRng::from_entropy(),
    };
    let mut levels = LevelController::new(config, rng)?;
    let mut renderer = Renderer::new();
    let mut celebration = Celebration::default();
    let mut fx_rng = rand::thread_rng();
    let mut last_fall = Instant::now();

    loop {
        let frame_start = Instant::now();
        while event::poll(Duration::from_millis(0))? {
            let level_event = match event::read()? {
                Event::Key(key) => match key.kind {
                    KeyEventKind::Press | KeyEventKind::Repeat => match key.code {
                        KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
                        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                            return Ok(())
                        }
                        KeyCode::Char('r') => levels.restart()?,
                        code => match dir_for_key(code) {
                            Some(dir) => levels.handle_move(dir, Instant::now()).1,
                            None => None,
                        },
                    },
                    _ => None,
                },
                Event::Resize(w, h) => {
                    info!("terminal resized to {}x{}", w, h);
                    renderer.invalidate();
                    levels.resize()?
                }
                _ => None,
            };
            if let Some(ev) = level_event {
                on_level_event(ev, &levels, &mut celebration, &mut renderer, &mut fx_rng);
            }
        }

        if let Some(ev) = levels.tick(Instant::now())? {
            on_level_event(ev, &levels, &mut celebration, &mut renderer, &mut fx_rng);
        }

        if celebration.is_active() && last_fall.elapsed() >= Duration::from_millis(SPARK_FALL_MS) {
            last_fall = Instant::now();
            celebration.fall(&mut fx_rng, levels.session());
        }

        renderer.render(stdout, &levels, &celebration)?;

        let elapsed = frame_start.elapsed();
        if elapsed < config.frame_time {
            thread::sleep(config.frame_time - elapsed);
        }
    }
}

fn on_level_event(
    event: LevelEvent,
    levels: &LevelController<StdRng>,
    celebration: &mut Celebration,
    renderer: &mut Renderer,
    fx_rng: &mut impl rand::Rng,
) {
    match event {
        LevelEvent::Completed { level } => {
            info!("celebrating level {}", level);
            celebration.burst(fx_rng, levels.session());
        }
        LevelEvent::Changed { level } => {
            info!("now on level {}", level);
            celebration.clear();
            renderer.invalidate();
        }
    }
}

fn dir_for_key(code: KeyCode) -> Option<Dir> {
    match code {
        KeyCode::Up | KeyCode::Char('k') => Some(Dir::Up),
        KeyCode::Right | KeyCode::Char('l') => Some(Dir::Right),
        KeyCode::Down | KeyCode::Char('j') => Some(Dir::Down),
        KeyCode::Left | KeyCode::Char('h') => Some(Dir::Left),
        _ => None,
    }
}
