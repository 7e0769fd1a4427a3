use vergen::{BuildBuilder, Emitter};

// main.rs reads VERGEN_BUILD_TIMESTAMP
fn main() -> Result<(), Box<dyn std::error::Error>> {
    let build = BuildBuilder::default().build_timestamp(true).build()?;
    Emitter::default().add_instructions(&build)?.emit()?;
    Ok(())
}
