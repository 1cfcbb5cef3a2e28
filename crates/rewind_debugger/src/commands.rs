//! Playback commands typed on stdin while a replay runs.

use std::str::FromStr;

/// A playback control request.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    Play,
    Pause,
    Resume,
    /// Pause if playing, resume if paused.
    Toggle,
    Reset,
    Speed(f64),
    Seek(i64),
    StepForward,
    StepBack,
    Status,
    Help,
    Quit,
}

impl FromStr for Command {
    type Err = String;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let mut parts = input.split_whitespace();
        let Some(word) = parts.next() else {
            return Ok(Command::Toggle);
        };
        let arg = parts.next();

        let command = match word.to_ascii_lowercase().as_str() {
            "play" => Command::Play,
            "pause" | "p" => Command::Pause,
            "resume" | "r" => Command::Resume,
            "reset" | "stop" => Command::Reset,
            "speed" | "x" => {
                let raw = arg.ok_or("speed needs a value, e.g. `speed 2`")?;
                let speed = raw
                    .trim_end_matches('x')
                    .parse()
                    .map_err(|_| format!("not a number: {raw}"))?;
                Command::Speed(speed)
            }
            "seek" | "g" => {
                let raw = arg.ok_or("seek needs an index, e.g. `seek 10`")?;
                Command::Seek(raw.parse().map_err(|_| format!("not an index: {raw}"))?)
            }
            "next" | "n" | "f" => Command::StepForward,
            "prev" | "b" => Command::StepBack,
            "status" | "s" => Command::Status,
            "help" | "h" | "?" => Command::Help,
            "quit" | "q" | "exit" => Command::Quit,
            other => return Err(format!("unknown command `{other}` (try `help`)")),
        };
        Ok(command)
    }
}

pub const HELP: &str = "\
commands:
  <enter>        toggle pause/resume
  play           start from the first record
  pause | p      pause playback
  resume | r     resume playback
  reset          stop and rewind
  speed <n>      set playback speed (e.g. 0.5, 2, 4x)
  seek <i>       jump to record index (clamped)
  next | prev    step the cursor one record
  status         print the timeline
  quit           exit";
