mod auth;
mod config;
mod overlay;
mod runtime;
mod source;
mod ui;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    runtime::run()
}
