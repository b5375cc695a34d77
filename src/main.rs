mod cli;
mod commands;
mod env_loader;
mod error;
mod ttt;

fn main() {
    env_loader::load_dotenv();

    if let Err(err) = cli::run() {
        match err.downcast_ref::<error::TttError>() {
            Some(ttt_err) => eprintln!("error[{}]: {err:#}", ttt_err.code().as_str()),
            None => eprintln!("error: {err:#}"),
        }
        std::process::exit(1);
    }
}
