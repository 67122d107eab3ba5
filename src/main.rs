use anyhow::Result;

use serialcom::cli::{actions::run_one_shot_actions, parse_args, LaunchOptions};

fn main() -> Result<()> {
    serialcom::boot::init_common();
    let matches = parse_args();

    if run_one_shot_actions(&matches)? {
        return Ok(());
    }

    let opts = LaunchOptions::from_matches(&matches)?;

    if let Some(port_name) = matches.get_one::<String>("monitor") {
        let runtime = tokio::runtime::Runtime::new()?;
        let result = runtime.block_on(serialcom::boot::start_monitor(port_name, &opts));
        // The stdin reader may still be blocked in a read; do not wait for it.
        runtime.shutdown_background();
        return result;
    }

    serialcom::boot::start_tui(&opts)
}
