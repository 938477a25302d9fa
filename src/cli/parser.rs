use crate::export::ExportFormat;
use clap::{Parser, Subcommand};

/// Command-line interface definition for rattendance
/// University class sessions, enrollments and attendance on SQLite
#[derive(Parser)]
#[command(
    name = "rattendance",
    version = env!("CARGO_PKG_VERSION"),
    about = "Manage university courses, class sessions and time-windowed attendance using SQLite",
    long_about = None
)]
pub struct Cli {
    /// Override database path (useful for tests or custom DB)
    #[arg(global = true, long = "db")]
    pub db: Option<String>,

    /// Run in test mode (no config file update)
    #[arg(global = true, long = "test", hide = true)]
    pub test: bool,

    /// Act as this user (email). Without it the local operator acts with admin rights.
    #[arg(global = true, long = "by", value_name = "EMAIL")]
    pub by: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database and configuration
    Init,

    /// Manage the configuration file (view or edit)
    Config {
        #[arg(long = "print", help = "Print the current configuration file")]
        print_config: bool,

        #[arg(long = "check", help = "Check configuration file for missing fields and add them")]
        check: bool,

        #[arg(
            long = "edit",
            help = "Edit the configuration file (default editor: $EDITOR, or nano/notepad)"
        )]
        edit_config: bool,

        #[arg(long = "editor", help = "Specify the editor to use (vim, nano, or custom path)")]
        editor: Option<String>,
    },

    /// Manage the database (migrations, integrity checks, etc.)
    Db {
        #[arg(long = "migrate", help = "Run pending database migrations")]
        migrate: bool,

        #[arg(long = "check", help = "Check database integrity")]
        check: bool,

        #[arg(long = "vacuum", help = "Optimize the database using VACUUM")]
        vacuum: bool,

        #[arg(long = "info", help = "Show database information")]
        info: bool,
    },

    /// Print the internal audit log
    Log {
        #[arg(long = "print", help = "Print rows from the internal log table")]
        print: bool,

        #[arg(long = "op", help = "Only show this operation (add, mark, schedule, ...)")]
        op: Option<String>,

        #[arg(long = "last", help = "Only show the last N rows")]
        last: Option<usize>,
    },

    /// Create a backup copy of the database
    Backup {
        #[arg(long, value_name = "FILE", help = "Absolute destination path")]
        file: String,

        #[arg(long, help = "Zip the copy and remove the uncompressed file")]
        compress: bool,

        #[arg(long, short = 'f', help = "Overwrite without asking")]
        force: bool,
    },

    /// Export attendance records
    Export {
        #[arg(long, value_enum, default_value = "csv")]
        format: ExportFormat,

        #[arg(long, value_name = "FILE", help = "Absolute output path")]
        file: String,

        #[arg(
            long,
            value_name = "RANGE",
            help = "YYYY, YYYY-MM, YYYY-MM-DD, A:B with the same format, or all"
        )]
        range: Option<String>,

        #[arg(long, value_name = "CODE")]
        course: Option<String>,

        #[arg(long, value_name = "EMAIL")]
        student: Option<String>,

        #[arg(long, help = "present, absent, late or excused")]
        status: Option<String>,

        #[arg(long, short = 'f')]
        force: bool,
    },

    /// Manage users (admins, lecturers, students)
    User {
        #[command(subcommand)]
        action: UserCmd,
    },

    /// Manage colleges
    College {
        #[command(subcommand)]
        action: CollegeCmd,
    },

    /// Manage departments
    Dept {
        #[command(subcommand)]
        action: DeptCmd,
    },

    /// Manage courses
    Course {
        #[command(subcommand)]
        action: CourseCmd,
    },

    /// Manage rooms (physical and virtual)
    Room {
        #[command(subcommand)]
        action: RoomCmd,
    },

    /// Assign lecturers to courses
    Assign {
        #[command(subcommand)]
        action: AssignCmd,
    },

    /// Enrollment requests and approvals
    Enroll {
        #[command(subcommand)]
        action: EnrollCmd,
    },

    /// Schedule, edit, list and cancel class sessions
    Session {
        #[command(subcommand)]
        action: SessionCmd,
    },

    /// Mark and review attendance
    Attend {
        #[command(subcommand)]
        action: AttendCmd,
    },

    /// Face registrations used to verify self-marking
    Face {
        #[command(subcommand)]
        action: FaceCmd,
    },

    /// Read notifications
    Notify {
        #[command(subcommand)]
        action: NotifyCmd,
    },

    /// Attendance reports
    Report {
        #[command(subcommand)]
        action: ReportCmd,
    },

    /// Role dashboard (admin dashboard without --user)
    Dashboard {
        #[arg(long, value_name = "EMAIL")]
        user: Option<String>,

        #[arg(long, value_name = "DATETIME", help = "Evaluate at 'YYYY-MM-DD HH:MM' instead of now")]
        at: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum UserCmd {
    Add {
        #[arg(long)]
        email: String,

        #[arg(long)]
        name: String,

        #[arg(long, help = "admin, lecturer or student (a/l/s)")]
        role: String,

        #[arg(long = "student-id")]
        student_id: Option<String>,

        #[arg(long = "lecturer-id")]
        lecturer_id: Option<String>,

        #[arg(long, value_name = "CODE")]
        dept: Option<String>,

        #[arg(long, help = "100..500, students only")]
        level: Option<String>,
    },
    List {
        #[arg(long)]
        role: Option<String>,

        #[arg(long, value_name = "CODE")]
        dept: Option<String>,

        #[arg(long, help = "Include inactive users")]
        all: bool,
    },
    Deactivate {
        #[arg(long)]
        email: String,
    },
}

#[derive(Subcommand)]
pub enum CollegeCmd {
    Add {
        #[arg(long)]
        code: String,

        #[arg(long)]
        name: String,

        #[arg(long, default_value = "")]
        description: String,
    },
    Edit {
        #[arg(long)]
        code: String,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        description: Option<String>,
    },
    Del {
        #[arg(long)]
        code: String,
    },
    List {
        #[arg(long, help = "Include inactive colleges")]
        all: bool,
    },
}

#[derive(Subcommand)]
pub enum DeptCmd {
    Add {
        #[arg(long)]
        code: String,

        #[arg(long)]
        name: String,

        #[arg(long, value_name = "CODE")]
        college: String,

        #[arg(long, default_value = "")]
        description: String,
    },
    Edit {
        #[arg(long)]
        code: String,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        description: Option<String>,
    },
    Del {
        #[arg(long)]
        code: String,
    },
    List {
        #[arg(long, value_name = "CODE")]
        college: Option<String>,

        #[arg(long)]
        all: bool,
    },
}

#[derive(Subcommand)]
pub enum CourseCmd {
    Add {
        #[arg(long)]
        code: String,

        #[arg(long)]
        title: String,

        #[arg(long, value_name = "CODE")]
        dept: String,

        #[arg(long)]
        level: String,

        #[arg(long, default_value_t = 3)]
        credits: i32,

        #[arg(long, default_value = "")]
        description: String,
    },
    Edit {
        #[arg(long)]
        code: String,

        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        description: Option<String>,

        #[arg(long)]
        credits: Option<i32>,
    },
    Del {
        #[arg(long)]
        code: String,
    },
    List {
        #[arg(long, value_name = "CODE")]
        dept: Option<String>,

        #[arg(long)]
        level: Option<String>,

        #[arg(long, help = "Match code or title")]
        search: Option<String>,

        #[arg(long)]
        all: bool,
    },
}

#[derive(clap::Args)]
pub struct RoomArgs {
    #[arg(long)]
    pub code: String,

    #[arg(long)]
    pub name: Option<String>,

    #[arg(long = "type", help = "physical or virtual")]
    pub room_type: Option<String>,

    #[arg(long)]
    pub capacity: Option<u32>,

    #[arg(long)]
    pub building: Option<String>,

    #[arg(long)]
    pub floor: Option<String>,

    #[arg(long)]
    pub facilities: Option<String>,

    #[arg(long, help = "zoom, teams, meet, webex or other (virtual rooms)")]
    pub platform: Option<String>,

    #[arg(long)]
    pub link: Option<String>,

    #[arg(long)]
    pub notes: Option<String>,
}

#[derive(Subcommand)]
pub enum RoomCmd {
    Add(RoomArgs),
    Edit {
        #[command(flatten)]
        room: RoomArgs,

        #[arg(long)]
        available: Option<bool>,
    },
    Del {
        #[arg(long)]
        code: String,
    },
    List {
        #[arg(long = "type")]
        room_type: Option<String>,

        #[arg(long, help = "Only rooms marked available")]
        available: bool,
    },
}

#[derive(Subcommand)]
pub enum AssignCmd {
    Add {
        #[arg(long, value_name = "CODE")]
        course: String,

        #[arg(long, value_name = "EMAIL")]
        lecturer: String,

        #[arg(long, help = "YYYY/YYYY, defaults to the configured academic year")]
        year: Option<String>,

        #[arg(long, help = "Defaults to the configured semester")]
        semester: Option<String>,
    },
    List {
        #[arg(long, value_name = "EMAIL")]
        lecturer: Option<String>,

        #[arg(long, value_name = "CODE")]
        course: Option<String>,

        #[arg(long)]
        year: Option<String>,

        #[arg(long)]
        semester: Option<String>,
    },
    Del {
        #[arg(long)]
        id: i64,
    },
}

#[derive(Subcommand)]
pub enum EnrollCmd {
    /// Student asks to join an assignment
    Request {
        #[arg(long, value_name = "EMAIL")]
        student: String,

        #[arg(long)]
        assignment: i64,
    },
    Approve {
        #[arg(long)]
        id: i64,

        #[arg(long)]
        notes: Option<String>,
    },
    Reject {
        #[arg(long)]
        id: i64,

        #[arg(long)]
        notes: Option<String>,
    },
    Withdraw {
        #[arg(long)]
        id: i64,
    },
    /// Admin enrolls a student directly (approved)
    Add {
        #[arg(long, value_name = "EMAIL")]
        student: String,

        #[arg(long)]
        assignment: i64,
    },
    List {
        #[arg(long, value_name = "EMAIL")]
        student: Option<String>,

        #[arg(long, value_name = "EMAIL")]
        lecturer: Option<String>,

        #[arg(long)]
        assignment: Option<i64>,

        #[arg(long)]
        status: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum SessionCmd {
    Add {
        #[arg(long)]
        assignment: i64,

        #[arg(long)]
        title: String,

        #[arg(long, default_value = "")]
        description: String,

        #[arg(long = "type", help = "lecture, tutorial, practical, seminar or exam")]
        class_type: Option<String>,

        #[arg(long, help = "YYYY-MM-DD")]
        date: String,

        #[arg(long = "start", help = "HH:MM")]
        start: String,

        #[arg(long = "end", help = "HH:MM")]
        end: String,

        #[arg(long, value_name = "CODE")]
        room: Option<String>,

        #[arg(long)]
        location: Option<String>,

        #[arg(long)]
        link: Option<String>,

        #[arg(long, help = "Minutes before start the window opens (0-1440)")]
        before: Option<i64>,

        #[arg(long, help = "Minutes after start the window closes (0-1440)")]
        after: Option<i64>,

        #[arg(long, help = "Attendance is not taken")]
        optional: bool,

        #[arg(long, help = "manual, face_recognition or both")]
        method: Option<String>,

        #[arg(long, help = "daily, weekly, biweekly or monthly")]
        recurrence: Option<String>,

        #[arg(long, value_name = "DATE", help = "Last date of the recurrence")]
        until: Option<String>,

        #[arg(long)]
        capacity: Option<u32>,

        #[arg(long = "allow-conflicts")]
        allow_conflicts: bool,
    },
    List {
        #[arg(long, value_name = "CODE")]
        course: Option<String>,

        #[arg(long, value_name = "DATE")]
        date: Option<String>,

        #[arg(long, value_name = "RANGE")]
        range: Option<String>,

        #[arg(long, value_name = "EMAIL")]
        lecturer: Option<String>,

        #[arg(long, value_name = "EMAIL")]
        student: Option<String>,

        #[arg(long, help = "Include cancelled sessions")]
        all: bool,
    },
    Show {
        #[arg(long)]
        id: i64,
    },
    /// Reschedule or change one session; enrolled students are notified
    Edit {
        #[arg(long)]
        id: i64,

        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        description: Option<String>,

        #[arg(long = "type", help = "lecture, tutorial, practical, seminar or exam")]
        class_type: Option<String>,

        #[arg(long, help = "YYYY-MM-DD")]
        date: Option<String>,

        #[arg(long = "start", help = "HH:MM")]
        start: Option<String>,

        #[arg(long = "end", help = "HH:MM")]
        end: Option<String>,

        #[arg(long, value_name = "CODE")]
        room: Option<String>,

        #[arg(long)]
        location: Option<String>,

        #[arg(long)]
        link: Option<String>,

        #[arg(long, help = "Minutes before start the window opens (0-1440)")]
        before: Option<i64>,

        #[arg(long, help = "Minutes after start the window closes (0-1440)")]
        after: Option<i64>,

        #[arg(long, help = "manual, face_recognition or both")]
        method: Option<String>,

        #[arg(long)]
        capacity: Option<u32>,

        #[arg(long = "allow-conflicts")]
        allow_conflicts: bool,
    },
    Cancel {
        #[arg(long)]
        id: i64,

        #[arg(long)]
        reason: String,
    },
    /// Sessions the student can mark right now
    Available {
        #[arg(long, value_name = "EMAIL")]
        student: String,

        #[arg(long, value_name = "DATETIME")]
        at: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum AttendCmd {
    Mark {
        #[arg(long)]
        session: i64,

        #[arg(long, value_name = "EMAIL")]
        student: String,

        #[arg(long, value_name = "FILE", help = "Captured face image")]
        image: Option<String>,

        #[arg(long, value_name = "DATETIME", help = "Act at 'YYYY-MM-DD HH:MM' (admins only)")]
        at: Option<String>,
    },
    Set {
        #[arg(long)]
        session: i64,

        #[arg(long, value_name = "EMAIL")]
        student: String,

        #[arg(long, help = "present, absent, late or excused (p/a/l/e)")]
        status: String,

        #[arg(long)]
        notes: Option<String>,

        #[arg(long, value_name = "DATETIME", help = "Act at 'YYYY-MM-DD HH:MM' (admins only)")]
        at: Option<String>,
    },
    Close {
        #[arg(long)]
        session: i64,

        #[arg(long, value_name = "DATETIME", help = "Act at 'YYYY-MM-DD HH:MM' (admins only)")]
        at: Option<String>,
    },
    List {
        #[arg(long)]
        session: i64,
    },
}

#[derive(Subcommand)]
pub enum FaceCmd {
    Register {
        #[arg(long, value_name = "EMAIL")]
        user: String,

        #[arg(long, value_name = "FILE")]
        image: String,
    },
    Remove {
        #[arg(long, value_name = "EMAIL")]
        user: String,
    },
    /// Face verification attempts made while marking attendance
    Log {
        #[arg(long, value_name = "EMAIL")]
        user: String,

        #[arg(long, help = "Only show the last N attempts")]
        last: Option<usize>,
    },
}

#[derive(Subcommand)]
pub enum NotifyCmd {
    List {
        #[arg(long, value_name = "EMAIL")]
        user: String,

        #[arg(long)]
        unread: bool,
    },
    Read {
        #[arg(long, value_name = "EMAIL")]
        user: String,

        #[arg(long, required_unless_present = "all")]
        id: Option<i64>,

        #[arg(long, conflicts_with = "id")]
        all: bool,
    },
}

#[derive(Subcommand)]
pub enum ReportCmd {
    Session {
        #[arg(long)]
        id: i64,
    },
    Student {
        #[arg(long, value_name = "EMAIL")]
        email: String,

        #[arg(long, value_name = "RANGE")]
        range: Option<String>,

        #[arg(long, value_name = "DATETIME")]
        at: Option<String>,
    },
    Course {
        #[arg(long, value_name = "CODE")]
        code: String,

        #[arg(long, value_name = "RANGE")]
        range: Option<String>,
    },
}
