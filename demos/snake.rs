use grid_planner::{Agent, AgentConfig, Canvas, Mode, PlanError};
use rand::prelude::*;
use std::thread::sleep;
use std::time::Duration;

// A snake-like agent on a 30x30 grid. It plans a route to the apple (G), showing every A*
// expansion, then walks the route and grows when it eats. Pass a seed as the first argument
// and a tick count as the second.

fn main() {
    let mut args = std::env::args().skip(1);
    let seed = args.next().and_then(|s| s.parse().ok()).unwrap_or(0);
    let ticks: usize = args.next().and_then(|s| s.parse().ok()).unwrap_or(2000);

    let config = AgentConfig::default();
    let mut agent = match Agent::from_config(config, StdRng::seed_from_u64(seed)) {
        Ok(agent) => agent,
        Err(e) => {
            eprintln!("{e}");
            return;
        }
    };
    for _ in 0..ticks {
        let state = match agent.tick() {
            Ok(state) => state,
            Err(PlanError::FullyOccupiedGrid { .. }) => {
                println!("The grid is full after {} apples.", agent.targets_reached());
                return;
            }
            Err(e) => {
                eprintln!("{e}");
                return;
            }
        };
        let canvas = Canvas::from_agent(agent.grid(), agent.walls(), &state);
        let mode = match state.mode {
            Mode::Planning => "planning",
            Mode::Following => "following",
        };
        println!(
            "\x1b[2J\x1b[Htick {} | {} | length {} | apples {}\n{}",
            agent.ticks(),
            mode,
            state.body.len(),
            agent.targets_reached(),
            canvas
        );
        sleep(Duration::from_millis(20));
    }
}
