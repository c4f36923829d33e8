use crate::grammar::{Grammar, GrammarTable};

/// The script language. Statement-level rules come before expression-level
/// ones so that `{ }` at the start of a statement is an empty block.
pub const SCRIPT: GrammarTable<'static> = &[
    ("Program", &[&["StatementList", "EOF"], &["EOF"]]),
    (
        "StatementList",
        &[&["Statement"], &["StatementList", "Statement"]],
    ),
    (
        "Statement",
        &[
            &["ExpressionStatement"],
            &["IfStatement"],
            &["WhileStatement"],
            &["LabelledStatement"],
            &["VariableDeclaration"],
            &["FunctionDeclaration"],
            &["BlockStatement"],
            &["BreakStatement"],
            &["ContinueStatement"],
            &["ReturnStatement"],
            &["EmptyStatement"],
        ],
    ),
    ("EmptyStatement", &[&[";"]]),
    ("BreakStatement", &[&["break", ";"], &["break", "Identifier", ";"]]),
    (
        "ContinueStatement",
        &[&["continue", ";"], &["continue", "Identifier", ";"]],
    ),
    ("ReturnStatement", &[&["return", ";"], &["return", "Expression", ";"]]),
    ("BlockStatement", &[&["{", "StatementList", "}"], &["{", "}"]]),
    (
        "IfStatement",
        &[
            &["if", "(", "Expression", ")", "Statement"],
            &["if", "(", "Expression", ")", "Statement", "else", "Statement"],
        ],
    ),
    ("WhileStatement", &[&["while", "(", "Expression", ")", "Statement"]]),
    ("LabelledStatement", &[&["Identifier", ":", "WhileStatement"]]),
    (
        "VariableDeclaration",
        &[
            &["var", "Identifier", ";"],
            &["let", "Identifier", ";"],
            &["const", "Identifier", ";"],
        ],
    ),
    (
        "FunctionDeclaration",
        &[
            &["function", "Identifier", "(", ")", "FunctionBody"],
            &["function", "Identifier", "(", "FormalParameterList", ")", "FunctionBody"],
        ],
    ),
    (
        "FormalParameterList",
        &[&["Identifier"], &["FormalParameterList", ",", "Identifier"]],
    ),
    ("FunctionBody", &[&["{", "StatementList", "}"], &["{", "}"]]),
    ("ExpressionStatement", &[&["Expression", ";"]]),
    ("Expression", &[&["AssignmentExpression"]]),
    (
        "AssignmentExpression",
        &[
            &["LeftHandSideExpression", "=", "AssignmentExpression"],
            &["LogicalORExpression"],
        ],
    ),
    (
        "LogicalORExpression",
        &[
            &["LogicalANDExpression"],
            &["LogicalORExpression", "||", "LogicalANDExpression"],
        ],
    ),
    (
        "LogicalANDExpression",
        &[
            &["EqualityExpression"],
            &["LogicalANDExpression", "&&", "EqualityExpression"],
        ],
    ),
    (
        "EqualityExpression",
        &[
            &["RelationalExpression"],
            &["EqualityExpression", "==", "RelationalExpression"],
            &["EqualityExpression", "!=", "RelationalExpression"],
        ],
    ),
    (
        "RelationalExpression",
        &[
            &["AdditiveExpression"],
            &["RelationalExpression", "<", "AdditiveExpression"],
            &["RelationalExpression", ">", "AdditiveExpression"],
            &["RelationalExpression", "<=", "AdditiveExpression"],
            &["RelationalExpression", ">=", "AdditiveExpression"],
        ],
    ),
    (
        "AdditiveExpression",
        &[
            &["MultiplicativeExpression"],
            &["AdditiveExpression", "+", "MultiplicativeExpression"],
            &["AdditiveExpression", "-", "MultiplicativeExpression"],
        ],
    ),
    (
        "MultiplicativeExpression",
        &[
            &["UnaryExpression"],
            &["MultiplicativeExpression", "*", "UnaryExpression"],
            &["MultiplicativeExpression", "/", "UnaryExpression"],
            &["MultiplicativeExpression", "%", "UnaryExpression"],
        ],
    ),
    (
        "UnaryExpression",
        &[
            &["LeftHandSideExpression"],
            &["!", "UnaryExpression"],
            &["-", "UnaryExpression"],
        ],
    ),
    (
        "LeftHandSideExpression",
        &[&["CallExpression"], &["NewExpression"]],
    ),
    (
        "CallExpression",
        &[
            &["MemberExpression", "Arguments"],
            &["CallExpression", "Arguments"],
            &["CallExpression", ".", "Identifier"],
            &["CallExpression", "[", "Expression", "]"],
        ],
    ),
    (
        "NewExpression",
        &[&["MemberExpression"], &["new", "NewExpression"]],
    ),
    (
        "MemberExpression",
        &[
            &["PrimaryExpression"],
            &["MemberExpression", ".", "Identifier"],
            &["MemberExpression", "[", "Expression", "]"],
            &["new", "MemberExpression", "Arguments"],
        ],
    ),
    (
        "PrimaryExpression",
        &[&["(", "Expression", ")"], &["this"], &["Literal"], &["Identifier"]],
    ),
    (
        "Literal",
        &[
            &["NumericLiteral"],
            &["StringLiteral"],
            &["BooleanLiteral"],
            &["NullLiteral"],
            &["ObjectLiteral"],
        ],
    ),
    ("ObjectLiteral", &[&["{", "}"], &["{", "PropertyList", "}"]]),
    (
        "PropertyList",
        &[&["Property"], &["PropertyList", ",", "Property"]],
    ),
    (
        "Property",
        &[
            &["StringLiteral", ":", "AssignmentExpression"],
            &["Identifier", ":", "AssignmentExpression"],
        ],
    ),
    ("Arguments", &[&["(", ")"], &["(", "ArgumentList", ")"]]),
    (
        "ArgumentList",
        &[
            &["AssignmentExpression"],
            &["ArgumentList", ",", "AssignmentExpression"],
        ],
    ),
];

/// The script grammar rooted at `Program`.
pub fn script() -> Grammar {
    Grammar::from_table("Program", SCRIPT).expect("built-in script grammar is well-formed")
}
