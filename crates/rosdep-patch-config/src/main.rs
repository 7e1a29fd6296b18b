fn main() -> anyhow::Result<()> {
    let schema = rosdep_patch_config::schema();
    println!("{}", serde_json::to_string_pretty(&schema)?);
    Ok(())
}
