use clap::Parser;
use deploytrace::{Cli, run};

fn main() {
    // Reset SIGPIPE so piping the tree into `head` does not panic
    #[cfg(unix)]
    reset_sigpipe();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        println!("Error: {}", e);
        println!();
        println!("{:?}", e);
        std::process::exit(-1);
    }
}

#[cfg(unix)]
fn reset_sigpipe() {
    unsafe {
        libc::signal(libc::SIGPIPE, libc::SIG_DFL);
    }
}
