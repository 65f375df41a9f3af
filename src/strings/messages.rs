//! # Messages
//!
//! Contains constant strings and format functions for user-facing messages.
//! Everything the bot says in a room is phrased here, so the engine and
//! composer stay free of copy.

use crate::domain::types::{House, Student};

pub const WELCOME_BANNER: &str = "Welcome to Hogwarts everyone!\n\
Now, in a few moments you will pass through these doors and join your classmates, \
but before you take your seats, you must be sorted into your houses. They are \
Gryffindor, Hufflepuff, Ravenclaw, and Slytherin. Now while you're here, your house \
will be like your family. Your triumphs will earn you points. Any rule breaking, and \
you will lose points. At the end of the year, the house with the most points is \
awarded the house cup.\n\
I will award points on your behalf. Just say `10 points to Gryffindor` or \
`5 points to @benc` to award points.";

pub const SCORES_RESET: &str =
    "The scores have been reset and we are ready for another great year at Hogwarts!";

pub const STANDINGS_HEADER: &str = "The House Points are:";

pub const ERASED: &str = "Poof, even a remembrall won't help you now Gilderoy.";

pub const SORTING_EXPLANATION: &str = "Students, you have two choices for sorting. \
If you wish to choose your house you need only ask `Professor can I please join Gryffindor`. \
For those more daring, you can let the Hat decide. Just say \
`Professor I would like to put my fate in the hands of the Sorting Hat`.\n\
Good luck, let the sorting begin.";

pub const UNKNOWN_STUDENT: &str = "I am unfamiliar with that student. In all my years I \
have never come across such a person. However, if they are over the age of 11 and \
possess magical abilities, I invite them to come to Hogwarts.";

pub const HEADMASTER_BIO: &str = "Well my name is Albus Percival Wulfric Brian Dumbledore, \
I am Headmaster of Hogwarts, I am famous for discovering the 12 uses of Dragon's blood, \
and my favorite candy is Lemon Drops.";

pub const BEST_STUDENT_CODA: &str = "I think they've earned some Chocolate Frogs.";

pub fn house_awarded(house: House, total: i64) -> String {
    format!(
        "Congratulations {name}! {name} house has {total} points!",
        name = house.display()
    )
}

pub fn house_deducted(house: House, total: i64) -> String {
    format!(
        "Alas {name}. {name} house now only has {total} points. Do not dwell on your \
         misdeeds, there is potential for greatness in all students!",
        name = house.display()
    )
}

pub fn standings_line(house: House, points: i64) -> String {
    format!("{} House: {points}", house.display())
}

pub fn student_enrolled(username: &str, house: House) -> String {
    format!(
        "Welcome {username}, the house of {} expects great things from you!",
        house.display()
    )
}

pub fn best_student_line(student: &Student) -> String {
    format!(
        "The head boy/girl of {} is @{} with {} points!",
        student.house.display(),
        student.username,
        student.points_earned
    )
}

pub fn worst_student_line(student: &Student) -> String {
    format!(
        "The student most likely to join the Inquisitorial Squad in {} is @{} who has \
         taken a total of {} points from their fellow students.",
        student.house.display(),
        student.username,
        student.points_taken
    )
}

pub fn student_stats(student: &Student) -> String {
    format!(
        "{} belongs to {} House, they have:\n earned: {} points\n taken: {} points\n \
         given: {} points\nI'm sure if you asked them in person they would tell you all \
         this information themself. Good day.",
        student.username,
        student.house.display(),
        student.points_earned,
        student.points_taken,
        student.points_given
    )
}

pub fn house_roster(house: House, members: &[String]) -> String {
    let mut out = format!("The students of {} House are:\n", house.display());
    for name in members {
        out.push_str(name);
        out.push('\n');
    }
    out
}

pub fn github_linked(username: &str, github_name: &str) -> String {
    format!("{username}'s github name is saved as {github_name}.")
}
