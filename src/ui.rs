use console::style;

use crate::orchestration::WorkflowResult;

pub fn display_error(message: &str) {
    eprintln!("{} {}", style("ERROR:").red().bold(), message);
}

pub fn display_success(message: &str) {
    println!("{} {}", style("✓").green(), message);
}

pub fn display_status(message: &str) {
    println!("{} {}", style("→").yellow(), message);
}

/// Summarize a finished run: branch, squashed commit subject, push state.
pub fn display_result(result: &WorkflowResult) {
    let subject = result.commit_message.lines().next().unwrap_or("");
    display_success(&format!(
        "rebuilt '{}' from '{}' with one commit: {}",
        result.release_branch, result.dev_branch, subject
    ));
    if result.pushed {
        display_success(&format!(
            "pushed '{}' to origin (force, upstream set)",
            result.release_branch
        ));
    } else {
        display_status(&format!(
            "not pushed; run `git push -f --set-upstream origin {}` or rerun with -f",
            result.release_branch
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_result_does_not_panic_on_empty_message() {
        let result = WorkflowResult {
            dev_branch: "feature_dev".into(),
            release_branch: "feature".into(),
            commit_message: String::new(),
            pushed: false,
        };
        display_result(&result);
    }
}
