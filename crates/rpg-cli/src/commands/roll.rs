use rpg_mechanics::DiceSpec;

pub fn run(spec: &str, seed: Option<u64>) -> Result<(), String> {
    let dice = DiceSpec::parse(spec).map_err(|e| e.to_string())?;
    let result = dice.roll(&mut super::rng(seed));
    println!("{dice}: {result}");
    Ok(())
}
