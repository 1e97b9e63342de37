// tests/property/main.rs

use proptest::prelude::*;

use planstep::plan::command::legacy_vars;
use planstep::plan::output::REFRESH_KEYWORD;
use planstep::plan::{format_plan_output, plan_filename, reindent_diff};
use planstep::version::ToolVersion;
use planstep_test_utils::builders::ContextBuilder;

// Lines built from the characters that matter to the normalizer, plus the
// refresh keyword now and then.
fn plan_output_strategy() -> impl Strategy<Value = String> {
    let line = prop_oneof![
        4 => "[ +~a-]{0,8}",
        1 => Just(format!("x: {REFRESH_KEYWORD}")),
    ];
    proptest::collection::vec(line, 0..12).prop_map(|lines| lines.join("\n"))
}

fn version_strategy() -> impl Strategy<Value = ToolVersion> {
    (0u64..2, 0u64..20, 0u64..20).prop_map(|(major, minor, patch)| ToolVersion::new(major, minor, patch))
}

proptest! {
    #[test]
    fn reindent_is_idempotent(output in plan_output_strategy()) {
        let once = reindent_diff(&output);
        prop_assert_eq!(reindent_diff(&once), once);
    }

    #[test]
    fn reindent_never_adds_lines(output in plan_output_strategy()) {
        prop_assert_eq!(reindent_diff(&output).lines().count(), output.lines().count());
    }

    #[test]
    fn modern_normalization_is_idempotent(
        output in plan_output_strategy(),
        minor in 14u64..20,
    ) {
        let version = ToolVersion::new(0, minor, 0);
        let once = format_plan_output(&output, &version);
        prop_assert_eq!(format_plan_output(&once, &version), once);
    }

    #[test]
    fn legacy_vars_only_before_0_12(version in version_strategy()) {
        let ctx = ContextBuilder::new().build();
        let vars = legacy_vars(&ctx, &version);

        if version < ToolVersion::new(0, 12, 0) {
            prop_assert_eq!(vars.len(), 10);
            for pair in vars.chunks(2) {
                prop_assert_eq!(pair[0].as_str(), "-var");
            }
        } else {
            prop_assert!(vars.is_empty());
        }
    }

    #[test]
    fn plan_filenames_never_contain_slashes(
        workspace in "[a-z]{1,8}",
        project in "[a-z/]{0,12}",
    ) {
        let name = plan_filename(&workspace, &project);
        prop_assert!(!name.contains('/'));
        let suffix = format!("{workspace}.tfplan");
        prop_assert!(name.ends_with(&suffix));
    }
}
