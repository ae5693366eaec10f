//! Startup banner rendering.

use crate::engine::modules::ModuleIndex;

const BANNER: &str = r"
    _                 _                _
   | |    ___   ___  | | __ ___  _   _| |_
   | |   / _ \ / _ \ | |/ // _ \| | | | __|
   | |__| (_) | (_) ||   <| (_) | |_| | |_
   |_____\___/ \___/ |_|\_\\___/ \__,_|\__|
";

const BANNER_SMALL: &str = "\nLOOKOUT\n";

/// Render the startup banner and module counts to stdout.
///
/// The accessible variant drops the ASCII art for screen readers, matching
/// the plain-output mode everywhere else.
pub fn print_banner(accessible: bool, version: &str, index: &ModuleIndex) {
    if accessible {
        println!("{BANNER_SMALL}");
        println!("lookout, version {version}");
    } else {
        println!("{BANNER}");
        println!("{:^48}", format!("[lookout v{version}]"));
    }
    println!();

    let counts = index.category_counts();
    if counts.is_empty() {
        println!("  no modules installed");
    } else {
        let width = counts
            .iter()
            .map(|(_, count)| count.to_string().len())
            .max()
            .unwrap_or(1);
        for (category, count) in counts {
            println!("  [{count:width$}] {category} modules");
        }
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn banner_art_mentions_the_console_name() {
        assert!(BANNER_SMALL.contains("LOOKOUT"));
        assert!(BANNER.contains('_'));
    }
}
