use std::fmt::Display;
use std::str::FromStr;

use crate::pose::Pose;

/// Parse `"x,y,z"`.
pub fn parse_triplet<T: FromStr>(s: &str) -> Result<(T, T, T), String>
where
    <T as FromStr>::Err: Display,
{
    let v = s.split(',').collect::<Vec<_>>();
    if v.len() != 3 {
        return Err(format!("expected 'x,y,z', got `{s}`"));
    }
    let parse = |s: &str| s.parse().map_err(|e: T::Err| e.to_string());
    Ok((parse(v[0])?, parse(v[1])?, parse(v[2])?))
}

/// Parse a pose given as `"sdr,theta,phi,gamma,bx,by,bz"`.
pub fn parse_pose(s: &str) -> Result<Pose, String> {
    let params = s
        .split(',')
        .map(|w| w.trim().parse())
        .collect::<Result<Vec<f32>, _>>()
        .map_err(|e| e.to_string())?;
    Pose::from_params(&params).map_err(|e| e.to_string())
}

/// Group numeric digits to facilitate reading long numbers
pub fn group_digits<F: Display>(n: F) -> String {
    use numsep::{separate, Locale};
    separate(n, Locale::English)
}

pub mod timing {

    use super::group_digits;
    use std::io::Write;
    use std::time::Instant;

    pub struct Progress {
        previous: Instant,
    }

    impl Progress {
        #[allow(clippy::new_without_default)]
        pub fn new() -> Self {
            Self { previous: Instant::now() }
        }

        /// Print message, append ellipsis, flush stdout, stay on same line,
        /// start timer.
        pub fn start(&mut self, message: &str) {
            print!("{message} ... ");
            std::io::stdout().flush().unwrap();
            self.start_timer();
        }

        // Print time elapsed since last start or done
        pub fn done(&mut self) {
            println!("{} ms", group_digits(self.previous.elapsed().as_millis()));
            self.start_timer();
        }

        // Print message followed by time elapsed since last start or done
        pub fn done_with_message(&mut self, message: &str) {
            println!("{message}: {} ms", group_digits(self.previous.elapsed().as_millis()));
            self.start_timer();
        }

        fn start_timer(&mut self) {
            self.previous = Instant::now()
        }
    }
}
