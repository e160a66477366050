use afl::fuzz;
use zpalloc::{Allocator, AllocConfig};

fn main() {
    fuzz!(|data: &[u8]| {
        if let Ok(input) = std::str::from_utf8(data) {
            if let Ok(tokens) = zpalloc::lex(input) {
                if let Ok(directives) = zpalloc::Parser::parse(&tokens) {
                    // Allocation must reject bad streams with an error, never a panic
                    let mut allocator = Allocator::new(AllocConfig::default());
                    let _ = allocator.run(&directives);
                }
            }
        }
    });
}
