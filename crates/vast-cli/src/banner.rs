//! Startup banner. Cheap ambient polish, not CLI-parser machinery — see
//! DESIGN.md's note on why this survives the Non-goal excluding the
//! parser's own implementation.

const BANNER: &str = r"
__   _____   __________
\ \ / / _ \ / ___|_   _|
 \ V / /_\ \\___ \ | |
 /   \|  _  | ___) || |
/_/ \_\_| |_/____/ |_|
";

pub fn print(no_colors: bool) {
    if no_colors {
        println!("{BANNER}");
    } else {
        println!("\x1b[36m{BANNER}\x1b[0m");
    }
    println!("vast {}", env!("CARGO_PKG_VERSION"));
}
