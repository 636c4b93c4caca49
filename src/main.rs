use anyhow::Result;
use clap::Parser;

use gitrel::git::SystemGit;
use gitrel::orchestration::{run_release_workflow, ReleaseWorkflowArgs};
use gitrel::store::{CutpointStore, STORE_FILE};
use gitrel::ui;

#[derive(clap::Parser)]
#[command(
    name = "gitrel",
    version,
    about = "Rebuild a release branch by squashing development commits past a cut-point"
)]
struct Args {
    #[arg(help = "Cut-point commit id: the newest commit to leave out of the release. \
                  Omit to reuse the one stored for the current branch")]
    cut_point: Option<String>,

    #[arg(short = 'f', long, help = "Force-push the rebuilt branch to origin")]
    force_push: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = Args::parse();

    let git = match SystemGit::open(std::path::Path::new(".")) {
        Ok(git) => git,
        Err(e) => {
            ui::display_error(&format!("not in a git repository: {}", e));
            std::process::exit(1);
        }
    };

    let store_path = match git.git_dir() {
        Ok(dir) => dir.join(STORE_FILE),
        Err(e) => {
            ui::display_error(&e.to_string());
            std::process::exit(1);
        }
    };
    let store = match CutpointStore::load(&store_path) {
        Ok(store) => store,
        Err(e) => {
            ui::display_error(&e.to_string());
            std::process::exit(1);
        }
    };

    let workflow_args = ReleaseWorkflowArgs {
        cut_point: args.cut_point,
        force_push: args.force_push,
    };

    let result = run_release_workflow(&workflow_args, &git, &store);

    // Saved on success and failure alike, so a cut-point supplied on the
    // command line is remembered for the next attempt.
    if let Err(e) = store.save() {
        ui::display_error(&format!("could not save cut-point store: {}", e));
    }

    match result {
        Ok(outcome) => {
            ui::display_result(&outcome);
            Ok(())
        }
        Err(e) => {
            ui::display_error(&e.to_string());
            std::process::exit(1);
        }
    }
}
