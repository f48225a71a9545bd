use std::collections::HashMap;
use std::io::Write;
use std::time::Duration;

cfg_if::cfg_if! {
    if #[cfg(target_family = "wasm")] {
        use web_time::Instant;
    } else {
        use std::time::Instant;
    }
}

#[derive(Debug, Default)]
struct InnerTimer {
    start: Option<Instant>,
    elapsed: Duration,
    subtimers: HashMap<&'static str, InnerTimer>,
}

impl InnerTimer {
    fn start(&mut self) {
        self.start = Some(Instant::now());
    }

    fn stop(&mut self) {
        if let Some(instant) = self.start.take() {
            self.elapsed += instant.elapsed();
        }
    }

    // bank the elapsed time of every running timer below
    // this one without marking it as stopped
    fn suspend(&mut self) {
        if let Some(instant) = self.start {
            self.elapsed += instant.elapsed();
            self.subtimers.values_mut().for_each(InnerTimer::suspend);
        }
    }

    fn resume(&mut self) {
        if self.start.is_some() {
            self.start = Some(Instant::now());
            self.subtimers.values_mut().for_each(InnerTimer::resume);
        }
    }

    fn print(&self, out: &mut dyn Write, key: &str, depth: usize) -> std::io::Result<()> {
        let tabs = " ".repeat(4 * depth);
        writeln!(out, "{}{} : {:?}", tabs, key, self.elapsed)?;
        let mut keys: Vec<_> = self.subtimers.keys().collect();
        keys.sort();
        for k in keys {
            self.subtimers[k].print(out, k, depth + 1)?;
        }
        Ok(())
    }
}

/// A tree of named timers.  Timers started while another is running
/// become children of the running timer.
#[derive(Default, Debug)]
pub struct Timers {
    stack: Vec<&'static str>,
    root: InnerTimer,
}

impl Timers {
    fn active_mut(&mut self) -> &mut InnerTimer {
        let mut active = &mut self.root;
        for &key in &self.stack {
            active = active.subtimers.entry(key).or_default();
        }
        active
    }

    /// clear all recorded times
    pub fn reset(&mut self) {
        self.stack.clear();
        self.root = InnerTimer::default();
    }

    /// start a timer with name `key` as a child of the current timer
    pub fn start_as_current(&mut self, key: &'static str) {
        self.active_mut().subtimers.entry(key).or_default().start();
        self.stack.push(key);
    }

    /// stop the current timer and make its parent current
    pub fn stop_current(&mut self) {
        self.active_mut().stop();
        self.stack.pop();
    }

    pub fn suspend(&mut self) {
        self.root.subtimers.values_mut().for_each(InnerTimer::suspend);
    }

    pub fn resume(&mut self) {
        self.root.subtimers.values_mut().for_each(InnerTimer::resume);
    }

    /// accumulated time of a top level timer
    pub fn elapsed(&self, key: &str) -> Duration {
        self.root
            .subtimers
            .get(key)
            .map_or(Duration::ZERO, |t| t.elapsed)
    }

    /// accumulated time of a top level timer, including the time
    /// since it was last started if it is still running
    pub fn running_time(&self, key: &str) -> Duration {
        self.root.subtimers.get(key).map_or(Duration::ZERO, |t| {
            t.elapsed + t.start.map_or(Duration::ZERO, |s| s.elapsed())
        })
    }

    pub fn total_time(&self) -> Duration {
        self.root.subtimers.values().map(|t| t.elapsed).sum()
    }

    pub fn print(&self, out: &mut dyn Write) -> std::io::Result<()> {
        let mut keys: Vec<_> = self.root.subtimers.keys().collect();
        keys.sort();
        for k in keys {
            self.root.subtimers[k].print(out, k, 0)?;
        }
        Ok(())
    }
}

macro_rules! timeit {
    ($timer:expr => $key:literal; $($tt:tt)+) => {
        $timer.start_as_current($key);
        $(
            $tt
        )+
        $timer.stop_current();
    }
}
pub(crate) use timeit;

macro_rules! notimeit {
    ($timer:expr; $($tt:tt)+) => {
        $timer.suspend();
        $(
            $tt
        )+
        $timer.resume();
    }
}
pub(crate) use notimeit;

#[test]
fn test_nested_timers() {
    let mut timers = Timers::default();
    timers.start_as_current("solve");
    timers.start_as_current("kkt");
    std::thread::sleep(Duration::from_millis(2));
    timers.stop_current();
    timers.stop_current();

    assert!(timers.elapsed("solve") >= Duration::from_millis(2));
    assert_eq!(timers.running_time("solve"), timers.elapsed("solve"));
    assert_eq!(timers.elapsed("kkt"), Duration::ZERO); // nested, not top level
    assert_eq!(timers.total_time(), timers.elapsed("solve"));

    let mut buf = Vec::new();
    timers.print(&mut buf).unwrap();
    let text = String::from_utf8(buf).unwrap();
    assert!(text.contains("solve"));
    assert!(text.contains("    kkt"));

    timers.reset();
    assert_eq!(timers.total_time(), Duration::ZERO);
}
