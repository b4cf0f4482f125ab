//! Built-in rule table
//!
//! Declaration order is precedence order: a rule placed earlier wins over
//! any later rule that would also match. Greetings only match when they
//! are the whole message, so "hello, who is carl?" reaches the intent.

use std::sync::Arc;

use lazy_static::lazy_static;

use crate::error::Result;
use crate::types::{Rule, RuleTable};

/// Static source for one rule
struct RuleSource {
    name: &'static str,
    patterns: &'static [&'static str],
    responses: &'static [&'static str],
}

const RULES: &[RuleSource] = &[
    // =========================================================================
    // Small talk
    // =========================================================================
    RuleSource {
        name: "greeting",
        patterns: &[
            r"^(hi|hello|hey|heya|hiya|howdy|greetings|yo|sup)(\s+(there|carl|bot|friend))?[\s!.,?]*$",
            r"^good\s+(morning|afternoon|evening)[\s!.,?]*$",
        ],
        responses: &[
            "Hey there! 👋 What would you like to know about Carl?",
            "Hello! Ask me anything about Carl's work, skills or projects.",
            "Hi! I'm Carl's assistant. How can I help?",
        ],
    },
    RuleSource {
        name: "how_are_you",
        patterns: &[
            r"\bhow\s+are\s+(you|u)\b",
            r"\bhow'?s\s+it\s+going\b",
            r"\bwhat'?s\s+up\b",
        ],
        responses: &[
            "I'm running smoothly, thanks for asking! What can I tell you about Carl?",
            "All systems go! Want to hear about Carl's projects?",
            "Doing great. Zero bugs today, as far as I know 😄",
        ],
    },
    // =========================================================================
    // About Carl
    // =========================================================================
    RuleSource {
        name: "who_is_carl",
        patterns: &[
            r"\bwho('?s|\s+is)\s+carl\b",
            r"\babout\s+carl\b",
            r"\btell\s+me\s+about\s+(him|carl)\b",
            r"^who('?s|\s+is)\s+he\b",
        ],
        responses: &[
            "Carl is a full-stack developer who loves building playful, polished web experiences, like this desktop you're using right now.",
            "Carl is a software engineer focused on web apps, clean UI and the occasional side project that gets out of hand.",
            "He's the developer behind this site! Carl builds full-stack applications and enjoys turning ideas into interactive products.",
        ],
    },
    RuleSource {
        name: "bot_identity",
        patterns: &[
            r"\bwho\s+are\s+(you|u)\b",
            r"\bwhat\s+are\s+(you|u)\b",
            r"\bare\s+(you|u)\s+(a\s+)?(bot|robot|ai|human|real)\b",
        ],
        responses: &[
            "I'm Carl's portfolio assistant: a small rule-based bot living inside this desktop.",
            "Just a friendly bot! I match what you type against a list of topics about Carl.",
        ],
    },
    RuleSource {
        name: "skills",
        patterns: &[
            r"\bskills?\b",
            r"\btech(nologies|\s*stack)\b",
            r"\bwhat\s+(languages|frameworks|tools)\b",
            r"\b(good\s+at|know\s+how\s+to)\b",
            r"\bprogramming\b",
        ],
        responses: &[
            "Carl works mostly with TypeScript, React and Next.js on the front end, and Node.js, PostgreSQL and Rust on the back end.",
            "His toolbox: TypeScript, React, Next.js, Tailwind, Node.js, SQL databases, and a growing fondness for Rust.",
            "Front end, back end and the glue in between. React and TypeScript are his daily drivers.",
        ],
    },
    RuleSource {
        name: "projects",
        patterns: &[
            r"\bprojects?\b",
            r"\bportfolio\b",
            r"\bwhat\s+(has|did)\s+(he|carl)\s+(built|build|made|make|created|create)\b",
            r"\bwork\s+samples?\b",
        ],
        responses: &[
            "Check out the Projects folder on the desktop! Highlights include this desktop site, a real-time chat app, and a typing-speed game.",
            "This very site is one of them. Open the Projects window to browse the rest, each with a live demo and source link.",
            "He's built dashboards, games and tools. The Projects window on the desktop has the full list.",
        ],
    },
    RuleSource {
        name: "availability",
        patterns: &[
            r"\b(hire|hiring|available|availability|freelance|open\s+to\s+work|job\s+offer)\b",
            r"\blooking\s+for\s+(a\s+)?(new\s+)?(job|role|position|work)\b",
        ],
        responses: &[
            "Carl is open to interesting opportunities! Drop a message through the Contact app and he'll get back to you.",
            "He's currently open to new roles and freelance work. Use the Contact window to reach out.",
        ],
    },
    RuleSource {
        name: "experience",
        patterns: &[
            r"\bexperience\b",
            r"\b(job|jobs|career|work\s+history|worked|employ\w*)\b",
            r"\bwhere\s+(does|did)\s+(he|carl)\s+work\b",
        ],
        responses: &[
            "Carl has several years of professional experience shipping web applications, from early-stage startups to larger product teams.",
            "He has worked across the stack on product teams, owning features from database schema to pixel-perfect UI.",
        ],
    },
    RuleSource {
        name: "education",
        patterns: &[r"\b(education|degree|university|college|school|studied|study)\b"],
        responses: &[
            "Carl studied Computer Science, and keeps learning through side projects and open source.",
            "He has a Computer Science background, topped up with a lot of self-directed learning.",
        ],
    },
    // =========================================================================
    // Getting in touch
    // =========================================================================
    RuleSource {
        name: "contact",
        patterns: &[
            r"\bcontact\b",
            r"\b(email|e-mail|mail|reach|linkedin|github)\b",
            r"\bget\s+in\s+touch\b",
        ],
        responses: &[
            "The easiest way is the Contact app on the desktop. Your message goes straight to Carl's inbox.",
            "Open the Contact window to send a message, or find his GitHub and LinkedIn in the Start menu.",
        ],
    },
    RuleSource {
        name: "resume",
        patterns: &[r"\b(resume|résumé|cv|curriculum)\b"],
        responses: &[
            "You can open Carl's résumé from the Documents folder on the desktop.",
            "His CV is in the Documents folder. Double-click to open it.",
        ],
    },
    RuleSource {
        name: "location",
        patterns: &[
            r"\bwhere\s+(is|does)\s+(he|carl)\s+(live|living|based|from)\b",
            r"\bwhere\s+is\s+(he|carl)\b",
            r"\b(location|located|based\s+in|time\s*zone)\b",
        ],
        responses: &[
            "Carl is based in Europe and happy to work remotely across time zones.",
            "He works remotely from Europe. The Weather app shows what it's like there today!",
        ],
    },
    RuleSource {
        name: "hobbies",
        patterns: &[r"\b(hobby|hobbies|free\s+time|for\s+fun|interests?|outside\s+of\s+work)\b"],
        responses: &[
            "Outside of code Carl enjoys music, drawing and beating his own typing-test record.",
            "He likes hiking, music and tinkering with retro computers, which might explain this desktop.",
        ],
    },
    // =========================================================================
    // The desktop itself
    // =========================================================================
    RuleSource {
        name: "site",
        patterns: &[
            r"\b(this|the)\s+(site|website|desktop|portfolio\s+site)\b",
            r"\bhow\s+(was|is)\s+(this|it)\s+(built|made)\b",
        ],
        responses: &[
            "This desktop is built with Next.js, React and TypeScript. Windows are draggable, minimizable, and the theme follows your preference.",
            "It's a Next.js app styled like a desktop OS. Try dragging windows around or switching the theme!",
        ],
    },
    RuleSource {
        name: "apps",
        patterns: &[r"\b(apps?|weather|crypto|news|music|maps?|paint|drawing|draw|typing\s+test|games?)\b"],
        responses: &[
            "The desktop has a bunch of apps: Weather, Crypto, News, Music search, Maps, a Paint gallery and a Typing Test with a leaderboard.",
            "Try the Typing Test and see if you can top the leaderboard, or leave a drawing in the Paint gallery!",
        ],
    },
    RuleSource {
        name: "joke",
        patterns: &[r"\b(joke|funny|make\s+me\s+laugh)\b"],
        responses: &[
            "Why do programmers prefer dark mode? Because light attracts bugs. 🐛",
            "There are 10 kinds of people: those who understand binary and those who don't.",
            "I'd tell you a UDP joke, but you might not get it.",
        ],
    },
    // =========================================================================
    // Closers
    // =========================================================================
    RuleSource {
        name: "thanks",
        patterns: &[r"\b(thanks|thank\s+you|thx|ty|cheers|appreciate\w*)\b"],
        responses: &[
            "You're welcome! Anything else you'd like to know?",
            "Happy to help! 😊",
            "Anytime!",
        ],
    },
    RuleSource {
        name: "goodbye",
        patterns: &[r"^(bye|goodbye|see\s+(you|ya)|cya|later)\b"],
        responses: &[
            "Bye! Thanks for stopping by. 👋",
            "See you around! Feel free to explore the rest of the desktop.",
        ],
    },
    RuleSource {
        name: "help",
        patterns: &[r"\b(help|what\s+can\s+you\s+do|options|commands|menu)\b"],
        responses: &[
            "You can ask me about Carl's skills, projects, experience, education, or how to contact him. Or use the quick buttons below!",
            "Try questions like \"What are his skills?\" or \"How can I contact him?\"",
        ],
    },
    RuleSource {
        name: "too_short",
        patterns: &[r"^.{0,2}$"],
        responses: &[
            "Could you tell me a bit more?",
            "Hmm, I need a few more words than that. Try asking about Carl's projects!",
        ],
    },
];

const DEFAULTS: &[&str] = &[
    "I'm not sure about that one. Try asking about Carl's skills, projects or experience!",
    "Hmm, I don't have an answer for that. Want to know how to contact Carl instead?",
    "That's outside what I know. I'm best at questions about Carl and this desktop.",
    "I didn't quite catch that. Type \"help\" to see what I can answer.",
];

lazy_static! {
    static ref BUILTIN: Arc<RuleTable> =
        Arc::new(build_builtin_table().expect("built-in rule table is valid"));
}

/// Compile the built-in table
pub fn build_builtin_table() -> Result<RuleTable> {
    let rules = RULES
        .iter()
        .map(|src| Rule::new(src.name, src.patterns, src.responses.iter().copied()))
        .collect::<Result<Vec<_>>>()?;
    RuleTable::new(rules, DEFAULTS.iter().copied())
}

/// Shared compiled built-in table
pub fn builtin_table() -> Arc<RuleTable> {
    Arc::clone(&BUILTIN)
}

// =============================================================================
// TESTS
// =============================================================================
