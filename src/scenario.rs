//! The scripted exercises, each answering one "which special member function
//! runs here?" question.

use crate::config::ElisionMode;
use crate::container::TraceVec;
use crate::error::{Error, Result};
use crate::frame::Frame;
use crate::recorder::Recorder;
use crate::strings::{BetterString, NaiveString};
use crate::tracer::Tracer;
use lazy_static::lazy_static;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scenario {
    CopyConstruct,
    CopyAssign,
    ReturnTemporary,
    ReturnNamed,
    ExplicitMove,
    AssignTemporary,
    PushBack,
    ReturnByValue,
    MoveAssign,
    SelfAssign,
    Reallocation,
    ShallowCopy,
    DeepCopy,
}

impl Scenario {
    pub const ALL: [Scenario; 13] = [
        Scenario::CopyConstruct,
        Scenario::CopyAssign,
        Scenario::ReturnTemporary,
        Scenario::ReturnNamed,
        Scenario::ExplicitMove,
        Scenario::AssignTemporary,
        Scenario::PushBack,
        Scenario::ReturnByValue,
        Scenario::MoveAssign,
        Scenario::SelfAssign,
        Scenario::Reallocation,
        Scenario::ShallowCopy,
        Scenario::DeepCopy,
    ];

    /// Exercise number as printed in the header.
    pub fn id(&self) -> &'static str {
        match self {
            Scenario::CopyConstruct => "1.1",
            Scenario::CopyAssign => "1.2",
            Scenario::ReturnTemporary => "2.1",
            Scenario::ReturnNamed => "2.2",
            Scenario::ExplicitMove => "2.3",
            Scenario::AssignTemporary => "2.4",
            Scenario::PushBack => "3.1",
            Scenario::ReturnByValue => "4.1",
            Scenario::MoveAssign => "5.1",
            Scenario::SelfAssign => "5.2",
            Scenario::Reallocation => "6.1",
            Scenario::ShallowCopy => "7.1",
            Scenario::DeepCopy => "7.2",
        }
    }

    pub fn slug(&self) -> &'static str {
        match self {
            Scenario::CopyConstruct => "copy-construct",
            Scenario::CopyAssign => "copy-assign",
            Scenario::ReturnTemporary => "return-temporary",
            Scenario::ReturnNamed => "return-named",
            Scenario::ExplicitMove => "explicit-move",
            Scenario::AssignTemporary => "assign-temporary",
            Scenario::PushBack => "push-back",
            Scenario::ReturnByValue => "return-by-value",
            Scenario::MoveAssign => "move-assign",
            Scenario::SelfAssign => "self-assign",
            Scenario::Reallocation => "reallocation",
            Scenario::ShallowCopy => "shallow-copy",
            Scenario::DeepCopy => "deep-copy",
        }
    }

    pub fn question(&self) -> &'static str {
        match self {
            Scenario::CopyConstruct => "What special member function is called to create t2?",
            Scenario::CopyAssign => "What special member function is called on the line t2 = t1;?",
            Scenario::ReturnTemporary => {
                "create_tracer returns a temporary. What initializes t3?"
            }
            Scenario::ReturnNamed => "Does returning a named local still avoid the move?",
            Scenario::ExplicitMove => "What does std::move do to create t4?",
            Scenario::AssignTemporary => "Which assignment operator is called here? Copy or Move?",
            Scenario::PushBack => "Which constructor does each push_back use, and why?",
            Scenario::ReturnByValue => {
                "With full optimization, how many move constructor calls do we see?"
            }
            Scenario::MoveAssign => {
                "What does a = std::move(b) invoke, and what happens to a's old resource?"
            }
            Scenario::SelfAssign => "What must a = a and a = std::move(a) leave behind?",
            Scenario::Reallocation => {
                "How are stored elements relocated when the buffer grows, and why does noexcept matter?"
            }
            Scenario::ShallowCopy => "What happens when two strings share one buffer?",
            Scenario::DeepCopy => "What changes once the copy owns its own buffer?",
        }
    }

    /// Resolves command-line selectors. With none given, exercise 1.1 runs.
    pub fn select<S: AsRef<str>>(selectors: &[S]) -> Result<Vec<Scenario>> {
        if selectors.is_empty() {
            return Ok(vec![Scenario::CopyConstruct]);
        }
        selectors
            .iter()
            .map(|selector| selector.as_ref().parse())
            .collect()
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.id(), self.slug())
    }
}

impl FromStr for Scenario {
    type Err = Error;

    /// Accepts an exercise number (`2.3`) or a slug (`explicit-move`).
    fn from_str(selector: &str) -> Result<Self> {
        let wanted = selector.trim().to_ascii_lowercase();
        Scenario::ALL
            .iter()
            .copied()
            .find(|scenario| scenario.id() == wanted || scenario.slug() == wanted)
            .ok_or_else(|| Error::unknown_scenario(selector))
    }
}

/// What a scenario script gets to work with.
pub struct Context<'a> {
    pub recorder: &'a Recorder,
    pub elision: ElisionMode,
}

impl Context<'_> {
    /// `Tracer createTracer(name) { return Tracer(name); }`
    fn create_tracer(&self, name: &str) -> Tracer {
        self.elision.return_value(Tracer::new(name, self.recorder))
    }

    /// `Tracer createTracerNamed(name) { Tracer temp(name); return temp; }`
    fn create_tracer_named(&self, name: &str) -> Tracer {
        let temp = Tracer::new(name, self.recorder);
        self.elision.return_value(temp)
    }

    fn note(&self, text: impl Into<String>) {
        self.recorder.note(text);
    }
}

type Script = fn(&Context<'_>);

lazy_static! {
    static ref SCRIPTS: HashMap<Scenario, Script> = {
        let mut scripts: HashMap<Scenario, Script> = HashMap::new();
        scripts.insert(Scenario::CopyConstruct, copy_construct);
        scripts.insert(Scenario::CopyAssign, copy_assign);
        scripts.insert(Scenario::ReturnTemporary, return_temporary);
        scripts.insert(Scenario::ReturnNamed, return_named);
        scripts.insert(Scenario::ExplicitMove, explicit_move);
        scripts.insert(Scenario::AssignTemporary, assign_temporary);
        scripts.insert(Scenario::PushBack, push_back);
        scripts.insert(Scenario::ReturnByValue, return_by_value);
        scripts.insert(Scenario::MoveAssign, move_assign);
        scripts.insert(Scenario::SelfAssign, self_assign);
        scripts.insert(Scenario::Reallocation, reallocation);
        scripts.insert(Scenario::ShallowCopy, shallow_copy);
        scripts.insert(Scenario::DeepCopy, deep_copy);
        scripts
    };
}

/// Runs scenarios against one recorder.
pub struct Runner {
    recorder: Recorder,
    elision: ElisionMode,
}

impl Runner {
    pub fn new(recorder: Recorder, elision: ElisionMode) -> Self {
        Runner { recorder, elision }
    }

    pub fn recorder(&self) -> &Recorder {
        &self.recorder
    }

    pub fn run(&self, scenario: Scenario) -> Result<()> {
        let script = SCRIPTS
            .get(&scenario)
            .ok_or_else(|| Error::unknown_scenario(scenario.slug()))?;
        tracing::debug!(%scenario, elision = ?self.elision, "running scenario");

        self.recorder.banner(format!("🚀 Exercise {}", scenario.id()));
        let context = Context {
            recorder: &self.recorder,
            elision: self.elision,
        };
        script(&context);
        self.recorder.flush()?;

        let heap = self.recorder.heap();
        tracing::debug!(
            allocated = heap.allocated(),
            freed = heap.freed(),
            "scenario finished"
        );
        Ok(())
    }

    /// Announces the program once, then runs each scenario in order.
    pub fn run_program(&self, scenarios: &[Scenario]) -> Result<()> {
        let ids: Vec<&str> = scenarios.iter().map(Scenario::id).collect();
        self.recorder
            .note(format!("Running program {}...", ids.join(", ")));
        for scenario in scenarios {
            self.run(*scenario)?;
        }
        Ok(())
    }

    pub fn run_all(&self) -> Result<()> {
        for scenario in Scenario::ALL {
            self.run(scenario)?;
        }
        Ok(())
    }
}

fn copy_construct(cx: &Context<'_>) {
    let t1 = Tracer::new("t1", cx.recorder);
    let _t2 = t1.clone();
    cx.note("...end of scope");
}

fn copy_assign(cx: &Context<'_>) {
    let t1 = Tracer::new("t1", cx.recorder);
    let mut t2 = Tracer::new("t2", cx.recorder);
    t2.copy_assign(&t1);
    cx.note("...end of scope");
}

fn return_temporary(cx: &Context<'_>) {
    let _t3 = cx.create_tracer("temp");
    cx.note("...end of scope");
}

fn return_named(cx: &Context<'_>) {
    let _t3 = cx.create_tracer_named("temp");
    cx.note("...end of scope");
}

fn explicit_move(cx: &Context<'_>) {
    let mut t1 = Tracer::new("t1", cx.recorder);
    let _t4 = t1.take();
    cx.note(format!("State of t1: name = '{}'", t1.name()));
}

fn assign_temporary(cx: &Context<'_>) {
    let mut t5 = Tracer::new("t5", cx.recorder);
    t5.move_assign(&mut cx.create_tracer("temp"));
}

fn push_back(cx: &Context<'_>) {
    let mut vec = TraceVec::new();
    let t1 = Tracer::new("t1", cx.recorder);

    cx.note("Pushing back t1 (lvalue)...");
    vec.push_copy(&t1);

    cx.note("Pushing back temporary (rvalue)...");
    vec.push(cx.create_tracer("temp"));
}

fn return_by_value(cx: &Context<'_>) {
    let _t = cx.create_tracer("temp");
    cx.note("...end");
}

fn move_assign(cx: &Context<'_>) {
    let mut a = Tracer::new("Alice", cx.recorder);
    let mut b = Tracer::new("Bob", cx.recorder);
    cx.note(format!("Before move: a = {}, b = {}", a, b));
    a.move_assign(&mut b);
    cx.note(format!("After move:  a = {}, b = {}", a, b));
}

fn self_assign(cx: &Context<'_>) {
    let mut frame = Frame::new(cx.recorder);
    let a = frame.declare("a");

    cx.note("Self copy-assignment (a = a)...");
    frame.copy_assign(a, a);
    cx.note("Self move-assignment (a = std::move(a))...");
    frame.move_assign(a, a);

    let value = frame[a]
        .resource()
        .map_or_else(|| "none".to_string(), |v| v.to_string());
    cx.note(format!("State of a: name = '{}', resource = {}", frame[a].name(), value));
}

fn reallocation(cx: &Context<'_>) {
    let mut vec = TraceVec::new();
    vec.reserve(4);

    cx.note("Adding 4 elements...");
    for name in ["v0", "v1", "v2", "v3"] {
        vec.emplace(|| Tracer::new(name, cx.recorder));
    }

    cx.note("Forcing reallocation...");
    vec.emplace(|| Tracer::new("v4", cx.recorder));

    cx.note(format!(
        "Size of vector: {}, capacity of vector: {}",
        vec.len(),
        vec.capacity()
    ));
}

fn shallow_copy(cx: &Context<'_>) {
    let str1 = NaiveString::new("Hello", cx.recorder);
    cx.note("Copying str1 to str2...");
    let mut str2 = str1.clone();

    cx.note(format!("str1: {}", str1));
    cx.note(format!("str2: {}", str2));

    str2.set_byte(0, b'J');
    cx.note("");
    cx.note("After modifying str2:");
    cx.note(format!("str1: {}", str1));
    cx.note(format!("str2: {}", str2));

    cx.note("");
    cx.note(format!(
        "Exiting scope. {} handles share one buffer, it is released once.",
        str1.owners()
    ));
}

fn deep_copy(cx: &Context<'_>) {
    let str1 = BetterString::new("Hello", cx.recorder);
    let mut str2 = str1.clone();

    cx.note(format!("str1: {}", str1));
    cx.note(format!("str2: {}", str2));

    str2.set_byte(0, b'J');
    cx.note("");
    cx.note("After modifying str2:");
    cx.note(format!("str1: {}", str1));
    cx.note(format!("str2: {}", str2));

    cx.note("");
    cx.note("Exiting scope. Destructors will be called.");
}
