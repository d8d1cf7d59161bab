// Fantasy points per game: 2 per kill, 1.5 per assist, 0.01 per CS, -0.5 per death.
// Worked in hundredths of a point so the rounding step sees exact values.
const KILL_HUNDREDTHS: i64 = 200;
const ASSIST_HUNDREDTHS: i64 = 150;
const CS_HUNDREDTHS: i64 = 1;
const DEATH_HUNDREDTHS: i64 = 50;

/// Points for one game, rounded half up (an exact `.5` goes toward +infinity).
pub fn points(kills: u32, deaths: u32, assists: u32, cs: u32) -> i64 {
    let hundredths = KILL_HUNDREDTHS * i64::from(kills)
        + ASSIST_HUNDREDTHS * i64::from(assists)
        + CS_HUNDREDTHS * i64::from(cs)
        - DEATH_HUNDREDTHS * i64::from(deaths);
    (hundredths + 50).div_euclid(100)
}
